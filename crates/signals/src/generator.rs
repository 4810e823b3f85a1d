// In crates/signals/src/generator.rs

use chrono::{DateTime, Utc};
use core_types::{
    Asset, IndicatorVote, Signal, SignalStatus, SignalType, Timeframe, MAX_CONFIRMATIONS,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::BTreeMap;
use std::ops::Range;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use crate::error::{Error, Result};

/// Indicators that vote on a generated signal.
pub const INDICATOR_NAMES: [&str; 5] = ["rsi", "macd", "ma", "bb", "stoch"];

const VOTES: [IndicatorVote; 3] = [IndicatorVote::Buy, IndicatorVote::Sell, IndicatorVote::Neutral];
const SIGNAL_TYPES: [SignalType; 2] = [SignalType::Buy, SignalType::Sell];

/// What a [`MockSignalGenerator`] may pick from.
///
/// Numeric ranges are half-open: `confidence: 65..95` yields 65 through 94.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratorProfile {
    pub name: &'static str,
    pub assets: Vec<Asset>,
    pub timeframes: Vec<Timeframe>,
    pub confidence: Range<u32>,
    pub confirmations: Range<u32>,
    /// Indicators that get a random vote. Empty means the signal carries none.
    pub indicators: Vec<&'static str>,
}

impl GeneratorProfile {
    /// The feed behind the full signals page.
    pub fn signals_page() -> Self {
        Self {
            name: "signals_page",
            assets: vec![Asset::EurUsd, Asset::GbpUsd, Asset::BtcUsd, Asset::Gold],
            timeframes: vec![Timeframe::M5, Timeframe::M15, Timeframe::M30, Timeframe::H1],
            confidence: 65..95,
            confirmations: 30..50,
            indicators: INDICATOR_NAMES.to_vec(),
        }
    }

    /// The feed behind the compact signals list.
    pub fn signals_list() -> Self {
        Self {
            name: "signals_list",
            assets: vec![
                Asset::EurUsd,
                Asset::GbpUsd,
                Asset::BtcUsd,
                Asset::Gold,
                Asset::UsdJpy,
            ],
            timeframes: vec![Timeframe::M5, Timeframe::M15, Timeframe::M30, Timeframe::H1],
            confidence: 70..90,
            confirmations: 30..50,
            indicators: Vec::new(),
        }
    }

    /// Checks that every field has something to choose from and that
    /// every value the ranges can produce forms a valid signal.
    pub fn validate(&self) -> Result<()> {
        if self.assets.is_empty() {
            return Err(Error::EmptyChoice { profile: self.name, field: "assets" });
        }
        if self.timeframes.is_empty() {
            return Err(Error::EmptyChoice { profile: self.name, field: "timeframes" });
        }
        check_range(self.name, "confidence", &self.confidence, 101)?;
        check_range(self.name, "confirmations", &self.confirmations, MAX_CONFIRMATIONS + 1)?;
        Ok(())
    }
}

fn check_range(profile: &'static str, field: &'static str, range: &Range<u32>, limit: u32) -> Result<()> {
    if range.is_empty() || range.end > limit {
        return Err(Error::InvalidRange {
            profile,
            field,
            start: range.start,
            end: range.end,
        });
    }
    Ok(())
}

/// Session-scoped id allocator. Clones share the same counter.
#[derive(Debug, Clone, Default)]
pub struct SignalSequence {
    last: Arc<AtomicU64>,
}

impl SignalSequence {
    /// A sequence whose first id is `last_id + 1`.
    pub fn starting_after(last_id: u64) -> Self {
        Self {
            last: Arc::new(AtomicU64::new(last_id)),
        }
    }

    pub fn next(&self) -> u64 {
        self.last.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn last(&self) -> u64 {
        self.last.load(Ordering::Relaxed)
    }
}

/// Produces one random, valid [`Signal`] per call.
#[derive(Debug)]
pub struct MockSignalGenerator {
    profile: GeneratorProfile,
    sequence: SignalSequence,
    rng: Mutex<StdRng>,
}

impl MockSignalGenerator {
    pub fn new(profile: GeneratorProfile, sequence: SignalSequence) -> Result<Self> {
        Self::with_rng(profile, sequence, StdRng::from_entropy())
    }

    /// A generator whose choices are reproducible for a given seed.
    pub fn with_seed(profile: GeneratorProfile, sequence: SignalSequence, seed: u64) -> Result<Self> {
        Self::with_rng(profile, sequence, StdRng::seed_from_u64(seed))
    }

    fn with_rng(profile: GeneratorProfile, sequence: SignalSequence, rng: StdRng) -> Result<Self> {
        profile.validate()?;
        Ok(Self {
            profile,
            sequence,
            rng: Mutex::new(rng),
        })
    }

    pub fn profile(&self) -> &GeneratorProfile {
        &self.profile
    }

    pub fn sequence(&self) -> &SignalSequence {
        &self.sequence
    }

    pub fn generate(&self) -> Signal {
        self.generate_at(Utc::now())
    }

    /// Generates a signal stamped with `now`.
    pub fn generate_at(&self, now: DateTime<Utc>) -> Signal {
        // A panic while holding the lock cannot leave the RNG in a bad state.
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let profile = &self.profile;

        let asset = profile.assets[rng.gen_range(0..profile.assets.len())];
        let timeframe = profile.timeframes[rng.gen_range(0..profile.timeframes.len())];
        let signal_type = SIGNAL_TYPES[rng.gen_range(0..SIGNAL_TYPES.len())];
        let confidence = rng.gen_range(profile.confidence.clone());
        let confirmations = rng.gen_range(profile.confirmations.clone());
        let indicators: BTreeMap<String, IndicatorVote> = profile
            .indicators
            .iter()
            .map(|name| (name.to_string(), VOTES[rng.gen_range(0..VOTES.len())]))
            .collect();
        drop(rng);

        let signal = Signal {
            id: self.sequence.next(),
            asset,
            timeframe,
            signal_type,
            confidence: f64::from(confidence),
            confirmations,
            timestamp: now,
            status: SignalStatus::Active,
            indicators,
            result: None,
        };
        tracing::trace!(
            id = signal.id,
            asset = %signal.asset,
            confidence = signal.confidence,
            profile = profile.name,
            "Generated mock signal."
        );
        signal
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn page_profile_stays_inside_its_ranges() {
        let generator =
            MockSignalGenerator::with_seed(GeneratorProfile::signals_page(), SignalSequence::default(), 7).unwrap();

        for _ in 0..2_000 {
            let signal = generator.generate();
            assert!(signal.validate().is_ok());
            assert!((65.0..95.0).contains(&signal.confidence));
            assert!((30..50).contains(&signal.confirmations));
            assert!(GeneratorProfile::signals_page().assets.contains(&signal.asset));
            assert!(GeneratorProfile::signals_page().timeframes.contains(&signal.timeframe));
            assert_eq!(signal.status, SignalStatus::Active);
            assert_eq!(signal.indicators.len(), INDICATOR_NAMES.len());
        }
    }

    #[test]
    fn list_profile_carries_no_votes() {
        let generator =
            MockSignalGenerator::with_seed(GeneratorProfile::signals_list(), SignalSequence::default(), 3).unwrap();

        for _ in 0..500 {
            let signal = generator.generate();
            assert!((70.0..90.0).contains(&signal.confidence));
            assert!(signal.indicators.is_empty());
        }
    }

    #[test]
    fn output_is_not_constant() {
        let generator =
            MockSignalGenerator::with_seed(GeneratorProfile::signals_page(), SignalSequence::default(), 11).unwrap();

        let samples: Vec<Signal> = (0..200).map(|_| generator.generate()).collect();
        let assets: HashSet<Asset> = samples.iter().map(|s| s.asset).collect();
        let confidences: HashSet<u64> = samples.iter().map(|s| s.confidence as u64).collect();
        assert_eq!(assets.len(), 4);
        assert!(confidences.len() > 10);
        assert!(samples.iter().any(|s| s.signal_type == SignalType::Buy));
        assert!(samples.iter().any(|s| s.signal_type == SignalType::Sell));
    }

    #[test]
    fn same_seed_gives_same_choices() {
        let now = Utc::now();
        let a = MockSignalGenerator::with_seed(GeneratorProfile::signals_page(), SignalSequence::default(), 42).unwrap();
        let b = MockSignalGenerator::with_seed(GeneratorProfile::signals_page(), SignalSequence::default(), 42).unwrap();

        for _ in 0..20 {
            assert_eq!(a.generate_at(now), b.generate_at(now));
        }
    }

    #[test]
    fn ids_continue_after_seed_list() {
        let sequence = SignalSequence::starting_after(5);
        let generator =
            MockSignalGenerator::with_seed(GeneratorProfile::signals_page(), sequence.clone(), 1).unwrap();

        assert_eq!(generator.generate().id, 6);
        assert_eq!(generator.generate().id, 7);
        assert_eq!(sequence.next(), 8);
        assert_eq!(sequence.last(), 8);
    }

    #[test]
    fn profiles_that_could_break_invariants_are_rejected() {
        let mut profile = GeneratorProfile::signals_page();
        profile.confirmations = 30..70;
        assert!(matches!(
            MockSignalGenerator::new(profile, SignalSequence::default()),
            Err(Error::InvalidRange { field: "confirmations", .. })
        ));

        let mut profile = GeneratorProfile::signals_list();
        profile.confidence = 90..90;
        assert!(profile.validate().is_err());

        let mut profile = GeneratorProfile::signals_list();
        profile.assets.clear();
        assert!(matches!(profile.validate(), Err(Error::EmptyChoice { field: "assets", .. })));
    }
}

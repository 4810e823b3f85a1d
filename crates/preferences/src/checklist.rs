// In crates/preferences/src/checklist.rs

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfirmationKind {
    Technical,
    Volume,
    Pattern,
    Price,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfirmationCheck {
    pub name: String,
    pub active: bool,
    #[serde(rename = "type")]
    pub kind: ConfirmationKind,
}

/// The confirmation checks a signal can be scored against, each switchable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfirmationChecklist {
    pub checks: Vec<ConfirmationCheck>,
}

impl Default for ConfirmationChecklist {
    fn default() -> Self {
        use ConfirmationKind::*;

        let checks = [
            ("RSI overbought", true, Technical),
            ("MACD bullish crossover", true, Technical),
            ("Moving average 50/200", true, Technical),
            ("Bollinger band breakout", false, Technical),
            ("Stochastic oversold", true, Technical),
            ("High trading volume", false, Volume),
            ("Reversal candle pattern", true, Pattern),
            ("Fibonacci levels", false, Pattern),
            ("Relative strength index", true, Technical),
            ("Moving average crossover", true, Technical),
            ("Head and shoulders pattern", false, Pattern),
            ("Support and resistance levels", true, Price),
        ]
        .into_iter()
        .map(|(name, active, kind)| ConfirmationCheck {
            name: name.to_string(),
            active,
            kind,
        })
        .collect();

        Self { checks }
    }
}

impl ConfirmationChecklist {
    /// Flips the check at `index` and returns its new state.
    pub fn toggle(&mut self, index: usize) -> Result<bool> {
        let check = self
            .checks
            .get_mut(index)
            .ok_or(Error::NoSuchConfirmation(index))?;
        check.active = !check.active;
        Ok(check.active)
    }

    pub fn enable_all(&mut self) {
        self.checks.iter_mut().for_each(|c| c.active = true);
    }

    pub fn disable_all(&mut self) {
        self.checks.iter_mut().for_each(|c| c.active = false);
    }

    pub fn active_count(&self) -> usize {
        self.checks.iter().filter(|c| c.active).count()
    }

    pub fn len(&self) -> usize {
        self.checks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.checks.is_empty()
    }
}

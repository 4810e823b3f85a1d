// In crates/preferences/src/indicators.rs

use serde::{Deserialize, Serialize};

/// Moving-average flavour used by the MA indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MaType {
    #[default]
    Ema,
    Sma,
    Wma,
}

/// Parameters of the five indicators and the confirmation threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndicatorSettings {
    pub rsi_enabled: bool,
    pub rsi_period: u32,
    pub rsi_overbought: u32,
    pub rsi_oversold: u32,
    pub rsi_weight: u32,

    pub macd_enabled: bool,
    pub macd_fast_period: u32,
    pub macd_slow_period: u32,
    pub macd_signal_period: u32,
    pub macd_weight: u32,

    pub ma_enabled: bool,
    pub ma_fast_period: u32,
    pub ma_slow_period: u32,
    pub ma_type: MaType,
    pub ma_weight: u32,

    pub bb_enabled: bool,
    pub bb_period: u32,
    pub bb_deviation: f64,
    pub bb_weight: u32,

    pub stoch_enabled: bool,
    pub stoch_k_period: u32,
    pub stoch_d_period: u32,
    pub stoch_slowing: u32,
    pub stoch_overbought: u32,
    pub stoch_oversold: u32,
    pub stoch_weight: u32,

    /// Confirmations (out of 60) a signal needs before it is issued.
    pub confirmation_threshold: u32,
}

impl Default for IndicatorSettings {
    fn default() -> Self {
        Self {
            rsi_enabled: true,
            rsi_period: 14,
            rsi_overbought: 70,
            rsi_oversold: 30,
            rsi_weight: 20,

            macd_enabled: true,
            macd_fast_period: 12,
            macd_slow_period: 26,
            macd_signal_period: 9,
            macd_weight: 20,

            ma_enabled: true,
            ma_fast_period: 9,
            ma_slow_period: 21,
            ma_type: MaType::Ema,
            ma_weight: 20,

            bb_enabled: true,
            bb_period: 20,
            bb_deviation: 2.0,
            bb_weight: 20,

            stoch_enabled: true,
            stoch_k_period: 14,
            stoch_d_period: 3,
            stoch_slowing: 3,
            stoch_overbought: 80,
            stoch_oversold: 20,
            stoch_weight: 20,

            confirmation_threshold: 60,
        }
    }
}

impl IndicatorSettings {
    /// Names of the indicators that are switched on.
    pub fn enabled_indicators(&self) -> Vec<&'static str> {
        [
            ("rsi", self.rsi_enabled),
            ("macd", self.macd_enabled),
            ("ma", self.ma_enabled),
            ("bb", self.bb_enabled),
            ("stoch", self.stoch_enabled),
        ]
        .into_iter()
        .filter_map(|(name, enabled)| enabled.then_some(name))
        .collect()
    }

    /// Sum of the weights of the enabled indicators.
    pub fn total_weight(&self) -> u32 {
        [
            (self.rsi_enabled, self.rsi_weight),
            (self.macd_enabled, self.macd_weight),
            (self.ma_enabled, self.ma_weight),
            (self.bb_enabled, self.bb_weight),
            (self.stoch_enabled, self.stoch_weight),
        ]
        .into_iter()
        .filter(|(enabled, _)| *enabled)
        .map(|(_, weight)| weight)
        .sum()
    }
}

/// The range a numeric input offers. Only a hint for the form; values outside
/// it are still accepted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FieldHint {
    pub field: &'static str,
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

impl FieldHint {
    const fn new(field: &'static str, min: f64, max: f64, step: f64) -> Self {
        Self { field, min, max, step }
    }

    pub fn admits(&self, value: f64) -> bool {
        (self.min..=self.max).contains(&value)
    }
}

const PERIOD: (f64, f64) = (2.0, 50.0);
const OVERBOUGHT: (f64, f64) = (50.0, 90.0);
const OVERSOLD: (f64, f64) = (10.0, 50.0);
const WEIGHT: (f64, f64) = (0.0, 40.0);

/// Input ranges for every numeric indicator setting.
pub fn field_hints() -> Vec<FieldHint> {
    let period = |field| FieldHint::new(field, PERIOD.0, PERIOD.1, 1.0);
    let weight = |field| FieldHint::new(field, WEIGHT.0, WEIGHT.1, 1.0);

    vec![
        period("rsiPeriod"),
        FieldHint::new("rsiOverbought", OVERBOUGHT.0, OVERBOUGHT.1, 1.0),
        FieldHint::new("rsiOversold", OVERSOLD.0, OVERSOLD.1, 1.0),
        weight("rsiWeight"),
        period("macdFastPeriod"),
        period("macdSlowPeriod"),
        period("macdSignalPeriod"),
        weight("macdWeight"),
        period("maFastPeriod"),
        period("maSlowPeriod"),
        weight("maWeight"),
        period("bbPeriod"),
        FieldHint::new("bbDeviation", 1.0, 4.0, 0.1),
        weight("bbWeight"),
        period("stochKPeriod"),
        period("stochDPeriod"),
        FieldHint::new("stochSlowing", 1.0, 10.0, 1.0),
        FieldHint::new("stochOverbought", OVERBOUGHT.0, OVERBOUGHT.1, 1.0),
        FieldHint::new("stochOversold", OVERSOLD.0, OVERSOLD.1, 1.0),
        weight("stochWeight"),
        FieldHint::new("confirmationThreshold", 50.0, 90.0, 1.0),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SettingsForm;
    use serde_json::json;

    #[test]
    fn defaults_sit_inside_their_hints() {
        let settings = serde_json::to_value(IndicatorSettings::default()).unwrap();
        for hint in field_hints() {
            let value = settings[hint.field].as_f64().unwrap();
            assert!(hint.admits(value), "{} = {} outside its hint", hint.field, value);
        }
    }

    #[test]
    fn defaults_enable_everything_at_equal_weight() {
        let settings = IndicatorSettings::default();
        assert_eq!(settings.enabled_indicators(), vec!["rsi", "macd", "ma", "bb", "stoch"]);
        assert_eq!(settings.total_weight(), 100);
        assert_eq!(settings.confirmation_threshold, 60);
    }

    #[test]
    fn form_accepts_out_of_hint_values_and_enum_names() {
        let mut form = SettingsForm::<IndicatorSettings>::default();
        form.set_field("rsiPeriod", json!(80)).unwrap();
        form.set_field("maType", json!("wma")).unwrap();
        form.set_field("bbDeviation", json!(2.5)).unwrap();
        form.set_field("macdEnabled", json!(false)).unwrap();

        let values = form.values();
        assert_eq!(values.rsi_period, 80);
        assert_eq!(values.ma_type, MaType::Wma);
        assert_eq!(values.bb_deviation, 2.5);
        assert_eq!(values.total_weight(), 80);

        assert!(form.set_field("maType", json!("hull")).is_err());
    }
}

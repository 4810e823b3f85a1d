// In crates/web-server/src/types.rs

use core_types::{Asset, CollectionMethod, Signal, SignalStatus, Timeframe};
use preferences::{FieldHint, IndicatorSettings, SaveStatus, SettingsForm, field_hints};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use signals::SignalCriteria;
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Signals matching an ad-hoc query, leaving the page's filter untouched.
#[derive(Debug, Serialize)]
pub struct SignalList {
    pub signals: Vec<Signal>,
    pub total: usize,
    pub criteria: SignalCriteria,
}

#[derive(Debug, Deserialize)]
pub struct StatusChange {
    pub status: SignalStatus,
}

#[derive(Debug, Deserialize)]
pub struct AnalysisSelection {
    pub asset: Asset,
    pub timeframe: Timeframe,
}

#[derive(Debug, Deserialize)]
pub struct CollectionRequest {
    pub method: CollectionMethod,
}

#[derive(Debug, Deserialize)]
pub struct AssetRequest {
    pub asset: Asset,
}

/// Which indicators the indicator form switches on, their combined weight,
/// and the input ranges the form offers.
#[derive(Debug, Serialize)]
pub struct IndicatorSummary {
    pub enabled: Vec<&'static str>,
    pub total_weight: u32,
    pub confirmation_threshold: u32,
    pub hints: Vec<FieldHint>,
}

impl IndicatorSummary {
    pub fn of(settings: &IndicatorSettings) -> Self {
        Self {
            enabled: settings.enabled_indicators(),
            total_weight: settings.total_weight(),
            confirmation_threshold: settings.confirmation_threshold,
            hints: field_hints(),
        }
    }
}

/// The settings page tabs, as they appear in the URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormName {
    Indicators,
    Notifications,
    General,
    Confirmations,
}

impl FromStr for FormName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "indicators" => Ok(FormName::Indicators),
            "notifications" => Ok(FormName::Notifications),
            "general" => Ok(FormName::General),
            "confirmations" => Ok(FormName::Confirmations),
            other => Err(Error::NotFound(format!("settings form '{}'", other))),
        }
    }
}

impl fmt::Display for FormName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FormName::Indicators => "indicators",
            FormName::Notifications => "notifications",
            FormName::General => "general",
            FormName::Confirmations => "confirmations",
        };
        f.write_str(name)
    }
}

/// A settings form as the client sees it.
#[derive(Debug, Serialize)]
pub struct FormView {
    pub values: Value,
    pub dirty: bool,
    pub status: SaveStatus,
}

impl FormView {
    pub fn of<T: Serialize>(form: &SettingsForm<T>) -> Result<Self> {
        Ok(Self {
            values: serde_json::to_value(form.values())?,
            dirty: form.is_dirty(),
            status: form.status(),
        })
    }
}

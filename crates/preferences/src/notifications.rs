// In crates/preferences/src/notifications.rs

use core_types::{Asset, Signal, SignalType, Timeframe};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotifyScope {
    #[default]
    All,
    Selected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationChannel {
    Telegram,
    Email,
    Sms,
}

/// Who gets told about new signals, and through which channels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationSettings {
    pub notifications_enabled: bool,
    pub min_confidence: f64,

    pub telegram_enabled: bool,
    pub telegram_chat_id: String,
    pub telegram_token: String,

    pub email_enabled: bool,
    pub email_address: String,
    pub email_subject_prefix: String,

    pub sms_enabled: bool,
    pub phone_number: String,

    pub notify_on_buy_signal: bool,
    pub notify_on_sell_signal: bool,
    pub notify_on_signal_expiry: bool,
    pub notify_on_system_events: bool,

    pub assets_to_notify: NotifyScope,
    pub selected_assets: Vec<Asset>,

    pub timeframes_to_notify: NotifyScope,
    pub selected_timeframes: Vec<Timeframe>,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            notifications_enabled: true,
            min_confidence: 70.0,

            telegram_enabled: true,
            telegram_chat_id: String::new(),
            telegram_token: String::new(),

            email_enabled: false,
            email_address: String::new(),
            email_subject_prefix: "[Trading Platform]".to_string(),

            sms_enabled: false,
            phone_number: String::new(),

            notify_on_buy_signal: true,
            notify_on_sell_signal: true,
            notify_on_signal_expiry: false,
            notify_on_system_events: true,

            assets_to_notify: NotifyScope::All,
            selected_assets: vec![Asset::EurUsd, Asset::GbpUsd, Asset::BtcUsd],

            timeframes_to_notify: NotifyScope::All,
            selected_timeframes: vec![Timeframe::M5, Timeframe::M15, Timeframe::H1],
        }
    }
}

impl NotificationSettings {
    fn in_scope(&self, signal: &Signal) -> bool {
        let asset_ok = match self.assets_to_notify {
            NotifyScope::All => true,
            NotifyScope::Selected => self.selected_assets.contains(&signal.asset),
        };
        let timeframe_ok = match self.timeframes_to_notify {
            NotifyScope::All => true,
            NotifyScope::Selected => self.selected_timeframes.contains(&signal.timeframe),
        };
        asset_ok && timeframe_ok
    }

    /// Whether a newly issued `signal` should produce a notification.
    pub fn should_notify(&self, signal: &Signal) -> bool {
        if !self.notifications_enabled || signal.confidence < self.min_confidence {
            return false;
        }
        let type_ok = match signal.signal_type {
            SignalType::Buy => self.notify_on_buy_signal,
            SignalType::Sell => self.notify_on_sell_signal,
        };
        type_ok && self.in_scope(signal)
    }

    /// Whether the expiry of `signal` should produce a notification.
    pub fn should_notify_expiry(&self, signal: &Signal) -> bool {
        self.notifications_enabled && self.notify_on_signal_expiry && self.in_scope(signal)
    }

    pub fn enabled_channels(&self) -> Vec<NotificationChannel> {
        [
            (NotificationChannel::Telegram, self.telegram_enabled),
            (NotificationChannel::Email, self.email_enabled),
            (NotificationChannel::Sms, self.sms_enabled),
        ]
        .into_iter()
        .filter_map(|(channel, enabled)| enabled.then_some(channel))
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SettingsForm;
    use chrono::Utc;
    use core_types::SignalStatus;
    use serde_json::json;
    use std::collections::BTreeMap;

    fn signal(asset: Asset, timeframe: Timeframe, signal_type: SignalType, confidence: f64) -> Signal {
        Signal {
            id: 1,
            asset,
            timeframe,
            signal_type,
            confidence,
            confirmations: 40,
            timestamp: Utc::now(),
            status: SignalStatus::Active,
            indicators: BTreeMap::new(),
            result: None,
        }
    }

    #[test]
    fn defaults_notify_confident_signals_on_telegram() {
        let settings = NotificationSettings::default();
        assert!(settings.should_notify(&signal(Asset::Silver, Timeframe::D1, SignalType::Sell, 70.0)));
        assert!(!settings.should_notify(&signal(Asset::EurUsd, Timeframe::M5, SignalType::Buy, 69.9)));
        assert_eq!(settings.enabled_channels(), vec![NotificationChannel::Telegram]);
    }

    #[test]
    fn selected_scopes_restrict_assets_and_timeframes() {
        let settings = NotificationSettings {
            assets_to_notify: NotifyScope::Selected,
            timeframes_to_notify: NotifyScope::Selected,
            ..NotificationSettings::default()
        };
        assert!(settings.should_notify(&signal(Asset::GbpUsd, Timeframe::H1, SignalType::Buy, 90.0)));
        assert!(!settings.should_notify(&signal(Asset::Gold, Timeframe::H1, SignalType::Buy, 90.0)));
        assert!(!settings.should_notify(&signal(Asset::GbpUsd, Timeframe::M30, SignalType::Buy, 90.0)));
    }

    #[test]
    fn type_switches_and_master_switch() {
        let mut form = SettingsForm::<NotificationSettings>::default();
        form.set_field("notifyOnSellSignal", json!(false)).unwrap();
        let sell = signal(Asset::EurUsd, Timeframe::M5, SignalType::Sell, 95.0);
        assert!(!form.values().should_notify(&sell));

        form.set_field("notificationsEnabled", json!(false)).unwrap();
        let buy = signal(Asset::EurUsd, Timeframe::M5, SignalType::Buy, 95.0);
        assert!(!form.values().should_notify(&buy));
    }

    #[test]
    fn expiry_is_off_by_default() {
        let settings = NotificationSettings::default();
        let expired = signal(Asset::EurUsd, Timeframe::M5, SignalType::Buy, 95.0);
        assert!(!settings.should_notify_expiry(&expired));

        let settings = NotificationSettings {
            notify_on_signal_expiry: true,
            ..settings
        };
        assert!(settings.should_notify_expiry(&expired));
    }

    #[test]
    fn selected_lists_decode_from_symbols() {
        let mut form = SettingsForm::<NotificationSettings>::default();
        form.set_field("selectedAssets", json!(["GOLD", "ETHUSD"])).unwrap();
        assert_eq!(form.values().selected_assets, vec![Asset::Gold, Asset::EthUsd]);
        assert!(form.set_field("selectedTimeframes", json!(["2h"])).is_err());
    }
}

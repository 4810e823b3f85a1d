// In crates/preferences/src/general.rs

use serde::{Deserialize, Serialize};

/// The general tab of the settings page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneralSettings {
    pub dark_mode: bool,
    pub language: String,
    pub email_notifications: bool,
    pub telegram_notifications: bool,
    pub sms_notifications: bool,
    pub auto_refresh: bool,
    /// Minutes between automatic refreshes.
    pub refresh_interval: u64,
    pub api_key: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            dark_mode: false,
            language: "ar".to_string(),
            email_notifications: true,
            telegram_notifications: true,
            sms_notifications: false,
            auto_refresh: true,
            refresh_interval: 5,
            api_key: String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SettingsForm;
    use serde_json::json;

    #[test]
    fn fields_are_edited_by_their_camel_case_names() {
        let mut form = SettingsForm::<GeneralSettings>::default();
        form.set_field("refreshInterval", json!(15)).unwrap();
        form.set_field("autoRefresh", json!(false)).unwrap();
        assert_eq!(form.values().refresh_interval, 15);
        assert!(!form.values().auto_refresh);
        assert!(form.set_field("refresh_interval", json!(1)).is_err());
    }
}

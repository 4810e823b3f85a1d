// In crates/preferences/src/lib.rs

pub mod checklist;
pub mod error;
pub mod form;
pub mod general;
pub mod indicators;
pub mod notifications;

// Re-export public types
pub use checklist::{ConfirmationCheck, ConfirmationChecklist, ConfirmationKind};
pub use error::{Error, Result};
pub use form::{SaveStatus, SaveTicket, SettingsForm, SAVE_DELAY, SUCCESS_DISPLAY};
pub use general::GeneralSettings;
pub use indicators::{field_hints, FieldHint, IndicatorSettings, MaType};
pub use notifications::{NotificationChannel, NotificationSettings, NotifyScope};

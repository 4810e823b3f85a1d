// In crates/engine/src/status.rs

use serde::Serialize;

/// Where a page's last refresh stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadStatus {
    #[default]
    Idle,
    Loading,
    Success,
    Error,
}

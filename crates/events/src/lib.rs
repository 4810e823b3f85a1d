// In crates/events/src/lib.rs

// --- Messages pushed to live dashboard clients ---

use chrono::{DateTime, Utc};
use core_types::{AnalysisSnapshot, CollectionOverview, DashboardSnapshot, Signal};
use preferences::NotificationChannel;
use serde::Serialize;

/// Represents a log message event to be sent to the UI.
#[derive(Debug, Clone, Serialize)]
pub struct WsLogMessage {
    pub timestamp: DateTime<Utc>,
    pub level: String,
    pub message: String,
}

/// A signal that was just prepended to the signal list, with how many old
/// signals fell out of the window to make room.
#[derive(Debug, Clone, Serialize)]
pub struct SignalAdded {
    pub signal: Signal,
    pub dropped: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    NewSignal,
    SignalExpired,
}

/// A signal the notification settings say the user should hear about, and
/// the channels it goes out on.
#[derive(Debug, Clone, Serialize)]
pub struct SignalNotification {
    pub kind: NotificationKind,
    pub signal: Signal,
    pub channels: Vec<NotificationChannel>,
}

/// The top-level WebSocket message enum.
/// `tag` and `content` are used by serde for clean JSON representation.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "payload")]
pub enum DashboardEvent {
    Log(WsLogMessage),
    DashboardUpdated(DashboardSnapshot),
    SignalAdded(SignalAdded),
    AnalysisUpdated(AnalysisSnapshot),
    CollectionUpdated(CollectionOverview),
    Notification(SignalNotification),
}

impl DashboardEvent {
    /// The `type` tag this event serializes with.
    pub fn kind(&self) -> &'static str {
        match self {
            DashboardEvent::Log(_) => "Log",
            DashboardEvent::DashboardUpdated(_) => "DashboardUpdated",
            DashboardEvent::SignalAdded(_) => "SignalAdded",
            DashboardEvent::AnalysisUpdated(_) => "AnalysisUpdated",
            DashboardEvent::CollectionUpdated(_) => "CollectionUpdated",
            DashboardEvent::Notification(_) => "Notification",
        }
    }
}

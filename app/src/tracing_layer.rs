// In app/src/tracing_layer.rs

use chrono::Utc;
use events::{DashboardEvent, WsLogMessage};
use std::fmt::Write;
use tokio::sync::broadcast;
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::Layer;

/// Forwards every log event to live dashboard clients.
pub struct WsBroadcastLayer {
    tx: broadcast::Sender<DashboardEvent>,
}

impl WsBroadcastLayer {
    pub fn new(tx: broadcast::Sender<DashboardEvent>) -> Self {
        Self { tx }
    }
}

impl<S> Layer<S> for WsBroadcastLayer
where
    S: Subscriber,
{
    fn on_event(&self, event: &Event<'_>, _ctx: tracing_subscriber::layer::Context<'_, S>) {
        // Nobody is listening yet; skip the formatting.
        if self.tx.receiver_count() == 0 {
            return;
        }

        let mut visitor = LogMessageVisitor::default();
        event.record(&mut visitor);

        let log_message = WsLogMessage {
            timestamp: Utc::now(),
            level: event.metadata().level().to_string(),
            message: visitor.finish(),
        };
        let _ = self.tx.send(DashboardEvent::Log(log_message));
    }
}

/// Collects the `message` field plus the structured fields as `key=value`.
#[derive(Default)]
struct LogMessageVisitor {
    message: String,
    fields: String,
}

impl LogMessageVisitor {
    fn finish(self) -> String {
        if self.fields.is_empty() {
            self.message
        } else if self.message.is_empty() {
            self.fields
        } else {
            format!("{} {}", self.message, self.fields)
        }
    }

    fn push_field(&mut self, name: &str, value: std::fmt::Arguments<'_>) {
        if !self.fields.is_empty() {
            self.fields.push(' ');
        }
        let _ = write!(self.fields, "{}={}", name, value);
    }
}

impl Visit for LogMessageVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        } else {
            self.push_field(field.name(), format_args!("{}", value));
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{:?}", value);
        } else {
            self.push_field(field.name(), format_args!("{:?}", value));
        }
    }
}

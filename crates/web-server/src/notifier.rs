// In crates/web-server/src/notifier.rs

use core_types::Signal;
use events::{DashboardEvent, NotificationKind, SignalNotification};
use preferences::{NotificationSettings, SettingsForm};
use std::sync::Arc;
use tokio::sync::{RwLock, broadcast};
use tokio::task::JoinHandle;

/// The notification for `signal`, or `None` when the settings filter it out
/// or no channel is switched on.
pub fn notification_for(
    settings: &NotificationSettings,
    kind: NotificationKind,
    signal: Signal,
) -> Option<SignalNotification> {
    let wanted = match kind {
        NotificationKind::NewSignal => settings.should_notify(&signal),
        NotificationKind::SignalExpired => settings.should_notify_expiry(&signal),
    };
    let channels = settings.enabled_channels();
    (wanted && !channels.is_empty()).then_some(SignalNotification {
        kind,
        signal,
        channels,
    })
}

/// Publishes a notification for every new signal the notification form lets
/// through. The form is read at the time each signal arrives.
pub fn spawn_notifier(
    ws_tx: &broadcast::Sender<DashboardEvent>,
    settings: Arc<RwLock<SettingsForm<NotificationSettings>>>,
) -> JoinHandle<()> {
    let mut rx = ws_tx.subscribe();
    let ws_tx = ws_tx.clone();
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(DashboardEvent::SignalAdded(added)) => {
                    let notification = {
                        let settings = settings.read().await;
                        notification_for(settings.values(), NotificationKind::NewSignal, added.signal)
                    };
                    if let Some(notification) = notification {
                        tracing::info!(
                            id = notification.signal.id,
                            channels = ?notification.channels,
                            "Notifying about a new signal."
                        );
                        let _ = ws_tx.send(DashboardEvent::Notification(notification));
                    }
                }
                Ok(_) => {}
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Notifier fell behind; some signals were not considered.");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use core_types::{Asset, SignalStatus, SignalType, Timeframe};
    use events::SignalAdded;
    use preferences::NotificationChannel;
    use serde_json::json;
    use std::collections::BTreeMap;
    use std::time::Duration;

    fn signal(id: u64, confidence: f64) -> Signal {
        Signal {
            id,
            asset: Asset::EurUsd,
            timeframe: Timeframe::H1,
            signal_type: SignalType::Buy,
            confidence,
            confirmations: 44,
            timestamp: Utc::now(),
            status: SignalStatus::Active,
            indicators: BTreeMap::new(),
            result: None,
        }
    }

    async fn next_notification(rx: &mut broadcast::Receiver<DashboardEvent>) -> SignalNotification {
        tokio::time::timeout(Duration::from_secs(1), async {
            loop {
                if let Ok(DashboardEvent::Notification(notification)) = rx.recv().await {
                    return notification;
                }
            }
        })
        .await
        .expect("no notification was published")
    }

    #[test]
    fn settings_decide_kind_and_channels() {
        let mut settings = NotificationSettings::default();
        let confident = notification_for(&settings, NotificationKind::NewSignal, signal(1, 90.0)).unwrap();
        assert_eq!(confident.channels, vec![NotificationChannel::Telegram]);
        assert!(notification_for(&settings, NotificationKind::NewSignal, signal(2, 50.0)).is_none());
        assert!(notification_for(&settings, NotificationKind::SignalExpired, signal(1, 90.0)).is_none());

        settings.telegram_enabled = false;
        assert!(notification_for(&settings, NotificationKind::NewSignal, signal(1, 90.0)).is_none());
    }

    #[tokio::test]
    async fn new_signals_are_filtered_by_the_current_form() {
        let (ws_tx, mut rx) = broadcast::channel(32);
        let form = Arc::new(RwLock::new(SettingsForm::<NotificationSettings>::default()));
        let notifier = spawn_notifier(&ws_tx, form.clone());

        for (id, confidence) in [(1, 90.0), (2, 50.0), (3, 75.0)] {
            let added = SignalAdded { signal: signal(id, confidence), dropped: 0 };
            ws_tx.send(DashboardEvent::SignalAdded(added)).unwrap();
        }
        assert_eq!(next_notification(&mut rx).await.signal.id, 1);
        assert_eq!(next_notification(&mut rx).await.signal.id, 3);

        form.write().await.set_field("minConfidence", json!(80)).unwrap();
        let added = SignalAdded { signal: signal(4, 75.0), dropped: 0 };
        ws_tx.send(DashboardEvent::SignalAdded(added)).unwrap();
        let added = SignalAdded { signal: signal(5, 85.0), dropped: 0 };
        ws_tx.send(DashboardEvent::SignalAdded(added)).unwrap();

        let notification = next_notification(&mut rx).await;
        assert_eq!(notification.signal.id, 5);
        assert_eq!(notification.kind, NotificationKind::NewSignal);
        notifier.abort();
    }
}

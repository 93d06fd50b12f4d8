//! Transient user-visible alerts for freshly pushed notifications

use crate::models::Notification;

pub trait AlertSink: Send + Sync {
    fn notify(&self, notification: &Notification);
}

/// Surfaces alerts through the log
#[derive(Debug, Default, Clone, Copy)]
pub struct LogAlertSink;

impl AlertSink for LogAlertSink {
    fn notify(&self, notification: &Notification) {
        tracing::info!(
            notification_id = notification.id,
            title = %notification.title,
            "🔔 {}",
            notification.message
        );
    }
}

/// Drops every alert
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentAlertSink;

impl AlertSink for SilentAlertSink {
    fn notify(&self, _notification: &Notification) {}
}

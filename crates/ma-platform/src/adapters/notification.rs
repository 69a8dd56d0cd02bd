use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use tracing::{info, warn};

use ma_core::notification::{Notification, NotificationKind};
use ma_core::ports::NotificationPort;

/// Writes notifications to the log.
#[derive(Debug, Clone, Default)]
pub struct TracingNotificationSink;

#[async_trait]
impl NotificationPort for TracingNotificationSink {
    async fn notify(&self, notification: Notification) {
        match notification.kind {
            NotificationKind::Success => info!(message = %notification.message, "notification"),
            NotificationKind::Error => warn!(message = %notification.message, "notification"),
        }
    }

    async fn clear(&self) {
        info!("notifications cleared");
    }
}

/// Keeps every notification for later inspection.
#[derive(Debug, Default)]
pub struct RecordingNotifications {
    seen: Mutex<Vec<Notification>>,
    clears: Mutex<usize>,
}

impl RecordingNotifications {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.seen
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn last(&self) -> Option<Notification> {
        self.notifications().pop()
    }

    pub fn clear_count(&self) -> usize {
        *self.clears.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl NotificationPort for RecordingNotifications {
    async fn notify(&self, notification: Notification) {
        self.seen
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(notification);
    }

    async fn clear(&self) {
        *self.clears.lock().unwrap_or_else(PoisonError::into_inner) += 1;
    }
}

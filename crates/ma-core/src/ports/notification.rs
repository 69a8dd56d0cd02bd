use async_trait::async_trait;

use crate::notification::Notification;

/// Surface that renders success/error banners.
#[async_trait]
pub trait NotificationPort: Send + Sync {
    async fn notify(&self, notification: Notification);

    /// Remove any pending banner.
    async fn clear(&self);
}

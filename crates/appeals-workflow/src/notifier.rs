use async_trait::async_trait;

use crate::error::NotificationError;

/// Outbound message delivery to a chat user.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, target: i64, message: &str) -> Result<(), NotificationError>;
}

use std::sync::Arc;

use async_trait::async_trait;

use appeals_workflow::{NotificationError, Notifier};

use crate::bot::BotApi;

/// Delivers workflow notifications as private Telegram messages.
/// A user's private chat id equals their user id.
pub struct TelegramNotifier {
    api: Arc<dyn BotApi>,
}

impl TelegramNotifier {
    pub fn new(api: Arc<dyn BotApi>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn notify(&self, target: i64, message: &str) -> Result<(), NotificationError> {
        self.api
            .send_message(target, message, None)
            .await
            .map_err(|e| NotificationError {
                target,
                reason: e.to_string(),
            })
    }
}

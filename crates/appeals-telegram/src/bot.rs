use async_trait::async_trait;

use crate::api::InlineKeyboardMarkup;

/// The Bot API calls the router and notifier need.
#[async_trait]
pub trait BotApi: Send + Sync {
    async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        keyboard: Option<&InlineKeyboardMarkup>,
    ) -> anyhow::Result<()>;

    async fn edit_message_text(&self, chat_id: i64, message_id: i64, text: &str) -> anyhow::Result<()>;

    async fn answer_callback_query(&self, callback_query_id: &str) -> anyhow::Result<()>;
}

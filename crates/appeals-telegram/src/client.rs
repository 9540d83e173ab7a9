use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::debug;

use crate::MAX_MESSAGE_LEN;
use crate::api::{ApiResponse, InlineKeyboardMarkup, Update, User};
use crate::bot::BotApi;

pub const DEFAULT_API_URL: &str = "https://api.telegram.org";

/// Longest long-poll timeout Telegram honours.
pub const MAX_POLL_TIMEOUT_SECS: u64 = 50;

#[derive(Debug, Clone)]
pub struct TelegramOptions {
    pub token: String,
    pub api_url: String,
    /// Long-poll timeout passed to `getUpdates`.
    pub poll_timeout_secs: u64,
}

#[derive(Debug, Clone)]
pub struct TelegramClient {
    http: Client,
    base_url: String,
    poll_timeout_secs: u64,
}

impl TelegramClient {
    pub fn new(options: TelegramOptions) -> Result<Self> {
        let poll_timeout_secs = options.poll_timeout_secs.min(MAX_POLL_TIMEOUT_SECS);
        // The HTTP timeout has to outlast a long poll that returns empty.
        let http = Client::builder()
            .timeout(Duration::from_secs(poll_timeout_secs + 15))
            .build()?;

        Ok(Self {
            http,
            base_url: format!("{}/bot{}", options.api_url.trim_end_matches('/'), options.token),
            poll_timeout_secs,
        })
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, body: &Value) -> Result<T> {
        let url = format!("{}/{}", self.base_url, method);
        let response = self.http.post(url).json(body).send().await?;
        let status = response.status();

        // Error envelopes come back with non-2xx statuses; decode them too.
        let envelope: ApiResponse<T> = response
            .json()
            .await
            .map_err(|e| anyhow::anyhow!("{}: undecodable response ({}): {}", method, status, e))?;
        envelope.into_result(method)
    }

    /// The bot's own account. Used as a startup credential check.
    pub async fn get_me(&self) -> Result<User> {
        self.call("getMe", &json!({})).await
    }

    /// Block until updates newer than `offset` arrive or the poll times out.
    pub async fn get_updates(&self, offset: i64) -> Result<Vec<Update>> {
        let updates = self.fetch_updates(offset, self.poll_timeout_secs).await?;
        if !updates.is_empty() {
            debug!("Received {} updates", updates.len());
        }
        Ok(updates)
    }

    /// Tell Telegram that everything before `offset` was handled, without
    /// waiting for new updates. Anything returned stays unacknowledged.
    pub async fn confirm_updates(&self, offset: i64) -> Result<()> {
        self.fetch_updates(offset, 0).await?;
        Ok(())
    }

    async fn fetch_updates(&self, offset: i64, timeout_secs: u64) -> Result<Vec<Update>> {
        self.call(
            "getUpdates",
            &json!({
                "offset": offset,
                "timeout": timeout_secs,
                "allowed_updates": ["message", "callback_query"],
            }),
        )
        .await
    }
}

#[async_trait]
impl BotApi for TelegramClient {
    async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        keyboard: Option<&InlineKeyboardMarkup>,
    ) -> Result<()> {
        let parts = split_message(text, MAX_MESSAGE_LEN);
        let last = parts.len().saturating_sub(1);

        for (i, part) in parts.iter().enumerate() {
            let mut body = json!({ "chat_id": chat_id, "text": part });
            // The keyboard goes under the final chunk.
            if let (Some(markup), true) = (keyboard, i == last) {
                body["reply_markup"] = serde_json::to_value(markup)?;
            }
            let _: Value = self.call("sendMessage", &body).await?;
        }
        Ok(())
    }

    async fn edit_message_text(&self, chat_id: i64, message_id: i64, text: &str) -> Result<()> {
        let _: Value = self
            .call(
                "editMessageText",
                &json!({ "chat_id": chat_id, "message_id": message_id, "text": text }),
            )
            .await?;
        Ok(())
    }

    async fn answer_callback_query(&self, callback_query_id: &str) -> Result<()> {
        let _: bool = self
            .call(
                "answerCallbackQuery",
                &json!({ "callback_query_id": callback_query_id }),
            )
            .await?;
        Ok(())
    }
}

/// Cut `text` into pieces of at most `max_chars` characters.
pub fn split_message(text: &str, max_chars: usize) -> Vec<String> {
    if text.is_empty() {
        return vec![String::new()];
    }

    let chars: Vec<char> = text.chars().collect();
    chars
        .chunks(max_chars.max(1))
        .map(|chunk| chunk.iter().collect())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_short_message_is_untouched() {
        assert_eq!(split_message("hello", 4096), vec!["hello"]);
    }

    #[test]
    fn test_split_long_message() {
        let text = "a".repeat(10_000);
        let parts = split_message(&text, 4096);
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0].len(), 4096);
        assert_eq!(parts[2].len(), 10_000 - 2 * 4096);
        assert_eq!(parts.concat(), text);
    }

    #[test]
    fn test_split_counts_chars_not_bytes() {
        let text = "📋".repeat(5);
        let parts = split_message(&text, 2);
        assert_eq!(parts, vec!["📋📋", "📋📋", "📋"]);
    }

    #[test]
    fn test_base_url_trims_slash() {
        let client = TelegramClient::new(TelegramOptions {
            token: "123:abc".into(),
            api_url: "http://localhost:8081/".into(),
            poll_timeout_secs: 1,
        })
        .unwrap();
        assert_eq!(client.base_url, "http://localhost:8081/bot123:abc");
    }

    #[test]
    fn test_poll_timeout_is_capped() {
        let client = TelegramClient::new(TelegramOptions {
            token: "123:abc".into(),
            api_url: DEFAULT_API_URL.into(),
            poll_timeout_secs: u64::MAX,
        })
        .unwrap();
        assert_eq!(client.poll_timeout_secs, MAX_POLL_TIMEOUT_SECS);
    }
}

use serde::{Deserialize, Serialize};

/// Envelope around every Bot API response.
#[derive(Debug, Deserialize)]
pub struct ApiResponse<T> {
    pub ok: bool,
    pub result: Option<T>,
    pub description: Option<String>,
    pub error_code: Option<i64>,
}

impl<T> ApiResponse<T> {
    pub fn into_result(self, method: &str) -> anyhow::Result<T> {
        match (self.ok, self.result) {
            (true, Some(result)) => Ok(result),
            (true, None) => Err(anyhow::anyhow!("{}: ok response without result", method)),
            (false, _) => Err(anyhow::anyhow!(
                "{} failed ({}): {}",
                method,
                self.error_code.unwrap_or_default(),
                self.description.unwrap_or_else(|| "no description".into())
            )),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<Message>,
    pub callback_query: Option<CallbackQuery>,
}

impl Update {
    /// The user who caused this update, if Telegram says.
    pub fn sender_id(&self) -> Option<i64> {
        if let Some(q) = &self.callback_query {
            return Some(q.from.id);
        }
        self.message.as_ref().and_then(|m| m.from.as_ref()).map(|u| u.id)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub message_id: i64,
    pub from: Option<User>,
    pub chat: Chat,
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: i64,
    #[serde(default)]
    pub is_bot: bool,
    pub first_name: String,
    pub last_name: Option<String>,
    pub username: Option<String>,
}

impl User {
    /// Username when set, otherwise first and last name.
    pub fn display_name(&self) -> String {
        match &self.username {
            Some(username) if !username.is_empty() => username.clone(),
            _ => format!(
                "{} {}",
                self.first_name,
                self.last_name.as_deref().unwrap_or_default()
            )
            .trim()
            .to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CallbackQuery {
    pub id: String,
    pub from: User,
    /// Absent when the originating message is too old.
    pub message: Option<Message>,
    pub data: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InlineKeyboardMarkup {
    pub inline_keyboard: Vec<Vec<InlineKeyboardButton>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InlineKeyboardButton {
    pub text: String,
    pub callback_data: String,
}

impl InlineKeyboardButton {
    pub fn callback(text: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            callback_data: data.into(),
        }
    }
}

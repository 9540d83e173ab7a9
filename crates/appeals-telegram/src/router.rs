use std::sync::Arc;

use tracing::{error, info};

use appeals_workflow::{AppealError, Workflow};

use crate::api::{CallbackQuery, InlineKeyboardMarkup, Message, Update, User};
use crate::bot::BotApi;
use crate::commands::Command;
use crate::replies;

/// Maps inbound Telegram updates onto workflow calls and answers the sender.
pub struct Router {
    workflow: Arc<Workflow>,
    api: Arc<dyn BotApi>,
    bot_username: Option<String>,
}

impl Router {
    pub fn new(workflow: Arc<Workflow>, api: Arc<dyn BotApi>) -> Self {
        Self {
            workflow,
            api,
            bot_username: None,
        }
    }

    /// Our own `@username`. Once set, `/cmd@OtherBot` is left alone.
    pub fn with_bot_username(mut self, username: Option<String>) -> Self {
        self.bot_username = username.filter(|u| !u.is_empty());
        self
    }

    pub async fn handle_update(&self, update: Update) {
        if let Some(query) = update.callback_query {
            self.handle_callback(query).await;
        } else if let Some(message) = update.message {
            self.handle_message(message).await;
        }
    }

    async fn handle_message(&self, message: Message) {
        let (Some(user), Some(text)) = (message.from.as_ref(), message.text.as_deref()) else {
            return;
        };
        if user.is_bot {
            return;
        }
        let chat_id = message.chat.id;

        if text.trim_start().starts_with('/') {
            if let Some(cmd) = Command::parse(text, self.bot_username.as_deref()) {
                self.handle_command(chat_id, user, cmd).await;
            }
            return;
        }

        match self.workflow.submit_draft(user.id, &user.display_name(), text).await {
            Ok(Some(appeal)) => self.reply(chat_id, &replies::submitted(&appeal)).await,
            Ok(None) => {}
            Err(e) => self.reply(chat_id, &error_reply(&e)).await,
        }
    }

    async fn handle_command(&self, chat_id: i64, user: &User, cmd: Command) {
        let caller = user.id;
        match cmd {
            Command::Start => {
                self.reply(chat_id, replies::welcome()).await;
                info!("User {} started the bot", caller);
            }
            Command::Appeal => {
                self.reply_with_keyboard(chat_id, replies::SELECT_TYPE, &replies::appeal_type_keyboard())
                    .await;
                info!("User {} requested appeal menu", caller);
            }
            Command::Pending => {
                let text = match self.workflow.list_pending(caller).await {
                    Ok(appeals) if appeals.is_empty() => replies::NO_PENDING.to_string(),
                    Ok(appeals) => replies::pending_list(&appeals),
                    Err(e) => error_reply(&e),
                };
                self.reply(chat_id, &text).await;
            }
            Command::View(arg) => {
                let text = match self.require_admin_arg(caller, "view", arg) {
                    Err(text) => text,
                    Ok(id) => match self.workflow.get_detail(caller, &id).await {
                        Ok(appeal) => replies::detail(&appeal),
                        Err(AppealError::NotFound(_)) => replies::not_found(&id),
                        Err(e) => error_reply(&e),
                    },
                };
                self.reply(chat_id, &text).await;
            }
            Command::Approve(arg) => self.decide(chat_id, caller, "approve", arg).await,
            Command::Reject(arg) => self.decide(chat_id, caller, "reject", arg).await,
            Command::Stats => {
                let text = match self.workflow.get_stats(caller).await {
                    Ok(stats) => replies::stats(&stats),
                    Err(e) => error_reply(&e),
                };
                self.reply(chat_id, &text).await;
            }
            Command::Unknown(_) => {}
        }
    }

    async fn decide(&self, chat_id: i64, caller: i64, command: &str, arg: Option<String>) {
        let id = match self.require_admin_arg(caller, command, arg) {
            Ok(id) => id,
            Err(text) => return self.reply(chat_id, &text).await,
        };

        let approving = command == "approve";
        let result = if approving {
            self.workflow.approve(caller, &id).await
        } else {
            self.workflow.reject(caller, &id).await
        };

        match result {
            Ok(decision) => {
                let (confirmation, verb) = if approving {
                    (replies::approved(&id), "approved")
                } else {
                    (replies::rejected(&id), "rejected")
                };
                self.reply(chat_id, &confirmation).await;
                if !decision.user_notified {
                    self.reply(chat_id, &replies::notify_failed(verb)).await;
                }
            }
            Err(AppealError::NotFound(_)) => {
                self.reply(chat_id, &replies::not_found_or_processed(&id)).await
            }
            Err(e) => self.reply(chat_id, &error_reply(&e)).await,
        }
    }

    /// Admin check first so that non-admins never see usage hints.
    fn require_admin_arg(
        &self,
        caller: i64,
        command: &str,
        arg: Option<String>,
    ) -> Result<String, String> {
        if !self.workflow.is_admin(caller) {
            return Err(replies::ACCESS_DENIED.to_string());
        }
        arg.ok_or_else(|| replies::usage(command))
    }

    async fn handle_callback(&self, query: CallbackQuery) {
        if let Err(e) = self.api.answer_callback_query(&query.id).await {
            error!("Failed to answer callback query {}: {}", query.id, e);
        }

        let data = query.data.as_deref().unwrap_or_default();
        let text = match self.workflow.begin_draft(query.from.id, data).await {
            Ok(appeal_type) => replies::writing_template(appeal_type),
            Err(AppealError::Validation(_)) => replies::INVALID_APPEAL_TYPE.to_string(),
            Err(e) => error_reply(&e),
        };

        match &query.message {
            Some(message) => {
                if let Err(e) = self
                    .api
                    .edit_message_text(message.chat.id, message.message_id, &text)
                    .await
                {
                    error!("Failed to edit message in chat {}: {}", message.chat.id, e);
                }
            }
            None => self.reply(query.from.id, &text).await,
        }
    }

    async fn reply(&self, chat_id: i64, text: &str) {
        if let Err(e) = self.api.send_message(chat_id, text, None).await {
            error!("Failed to reply in chat {}: {}", chat_id, e);
        }
    }

    async fn reply_with_keyboard(&self, chat_id: i64, text: &str, keyboard: &InlineKeyboardMarkup) {
        if let Err(e) = self.api.send_message(chat_id, text, Some(keyboard)).await {
            error!("Failed to reply in chat {}: {}", chat_id, e);
        }
    }
}

fn error_reply(err: &AppealError) -> String {
    match err {
        AppealError::Unauthorized => replies::ACCESS_DENIED.to_string(),
        AppealError::Storage(_) => replies::DATABASE_ERROR.to_string(),
        AppealError::Validation(msg) => format!("❌ {msg}"),
        AppealError::NotFound(id) => replies::not_found(id),
    }
}

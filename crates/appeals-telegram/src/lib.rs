//! Telegram transport for the appeals workflow.
//!
//! - `client`: Bot API calls over HTTPS
//! - `router`: inbound commands, callbacks and text mapped onto `Workflow`
//! - `poller`: `getUpdates` long-polling loop feeding the router
//! - `notifier`: the workflow's outbound `Notifier` on top of the Bot API

pub mod api;
pub mod bot;
pub mod client;
pub mod commands;
pub mod notifier;
pub mod poller;
pub mod replies;
pub mod router;

pub use bot::BotApi;
pub use client::TelegramClient;
pub use notifier::TelegramNotifier;
pub use router::Router;

/// Telegram rejects `sendMessage` texts longer than this.
pub const MAX_MESSAGE_LEN: usize = 4096;

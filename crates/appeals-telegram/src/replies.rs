//! Chat replies sent back to whoever issued a command.

use appeals_types::{Appeal, AppealStats, AppealType};
use appeals_workflow::notices::TIME_FORMAT;

use crate::api::{InlineKeyboardButton, InlineKeyboardMarkup};

/// Pending-list entries show only the start of the appeal text.
const PREVIEW_CHARS: usize = 100;
const SEPARATOR: &str = "───────────────";

pub const ACCESS_DENIED: &str = "❌ Access denied.";
pub const DATABASE_ERROR: &str = "❌ Database error. Please try again later.";
pub const INVALID_APPEAL_TYPE: &str = "❌ Invalid appeal type";
pub const NO_PENDING: &str = "📋 No pending appeals!";
pub const SELECT_TYPE: &str = "Select appeal type:";

pub fn welcome() -> &'static str {
    "📝 Welcome to the Appeals Bot!\n\n\
     Use /appeal to submit a FedBan appeal or request Fed Admin status"
}

pub fn appeal_type_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup {
        inline_keyboard: vec![
            vec![InlineKeyboardButton::callback("🔓 Fed Unban Appeal", AppealType::Unban.as_str())],
            vec![InlineKeyboardButton::callback(
                "👑 Fed Admin Request",
                AppealType::AdminRequest.as_str(),
            )],
        ],
    }
}

/// Writing instructions shown once the user picked a type.
pub fn writing_template(appeal_type: AppealType) -> String {
    let (what, questions) = match appeal_type {
        AppealType::Unban => (
            "unban",
            "📝 Please write your appeal in detail. Example:\n\
             1. Why were you banned?\n\
             2. What have you learned?\n\
             3. Why should we unban you?\n\
             4. Any additional information?",
        ),
        AppealType::AdminRequest => (
            "admin request",
            "📝 Please write your admin request. Example:\n\
             1. Why do you want to be an admin?\n\
             2. What experience do you have?\n\
             3. How will you help the community?\n\
             4. Any additional information?",
        ),
    };
    format!("✍️ Please write and submit your {what} appeal.\n\n{questions}\n\nType your appeal now:")
}

pub fn submitted(appeal: &Appeal) -> String {
    format!(
        "✅ {} appeal submitted successfully!\nAppeal ID: {}\n\n\
         Your appeal will be reviewed by an admin.",
        appeal.appeal_type.label(),
        appeal.id
    )
}

pub fn usage(command: &str) -> String {
    format!("❌ Usage: /{command} <appeal_id>")
}

pub fn not_found(id: &str) -> String {
    format!("❌ Appeal {id} not found.")
}

pub fn not_found_or_processed(id: &str) -> String {
    format!("❌ Appeal {id} not found or already processed.")
}

pub fn approved(id: &str) -> String {
    format!("✅ Appeal {id} approved successfully!")
}

pub fn rejected(id: &str) -> String {
    format!("❌ Appeal {id} rejected.")
}

pub fn notify_failed(verb: &str) -> String {
    format!("Appeal {verb} but failed to notify user.")
}

pub fn pending_list(appeals: &[Appeal]) -> String {
    let mut out = String::from("📋 Pending Appeals:\n\n");
    for appeal in appeals {
        let preview: String = appeal.text.chars().take(PREVIEW_CHARS).collect();
        let ellipsis = if appeal.text.chars().count() > PREVIEW_CHARS { "..." } else { "" };
        out.push_str(&format!(
            "ID: {}\nUser: {} (ID: {})\nType: {}\nTime: {}\nText: {}{}\n{}\n",
            appeal.id,
            appeal.display_name,
            appeal.user_id,
            appeal.appeal_type.label(),
            appeal.created_at.format(TIME_FORMAT),
            preview,
            ellipsis,
            SEPARATOR,
        ));
    }
    out
}

pub fn detail(appeal: &Appeal) -> String {
    format!(
        "📄 Appeal Details {id}\n\
         User: {name} (ID: {uid})\n\
         Type: {label}\n\
         Status: {status}\n\
         Time: {time}\n\n\
         📝 Appeal Text:\n{text}\n\n\
         Use /approve {id} to approve\n\
         Use /reject {id} to reject",
        id = appeal.id,
        name = appeal.display_name,
        uid = appeal.user_id,
        label = appeal.appeal_type.label(),
        status = appeal.status,
        time = appeal.created_at.format(TIME_FORMAT),
        text = appeal.text,
    )
}

pub fn stats(stats: &AppealStats) -> String {
    let by_type: Vec<String> = stats
        .by_type
        .iter()
        .map(|(ty, count)| format!("• {}: {}", ty.label(), count))
        .collect();

    format!(
        "📊 Appeal Statistics\n\n\
         Total Appeals: {}\n\
         Pending: {}\n\
         Approved: {}\n\
         Rejected: {}\n\n\
         Recent Activity:\n\
         • Last 24h: {}\n\
         • Last 7 days: {}\n\n\
         By Appeal Type:\n{}\n\n\
         Use /pending to view pending appeals",
        stats.total,
        stats.pending,
        stats.approved,
        stats.rejected,
        stats.last_24h,
        stats.last_7d,
        by_type.join("\n"),
    )
}

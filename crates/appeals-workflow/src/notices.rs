//! Texts sent to third parties as a side effect of a lifecycle transition.

use appeals_types::Appeal;

pub const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub fn new_appeal_for_admin(appeal: &Appeal) -> String {
    format!(
        "🚨 New Appeal {id}\n\
         User: {name} (ID: {uid})\n\
         Type: {label}\n\
         Time: {time}\n\n\
         📝 Appeal Text:\n{text}\n\n\
         Use /approve {id} to approve\n\
         Use /reject {id} to reject\n\n\
         Use /pending to view all pending appeals",
        id = appeal.id,
        name = appeal.display_name,
        uid = appeal.user_id,
        label = appeal.appeal_type.label(),
        time = appeal.created_at.format(TIME_FORMAT),
        text = appeal.text,
    )
}

pub fn approved_for_user(appeal: &Appeal) -> String {
    format!(
        "🎉 Your {} appeal has been approved!\nAppeal ID: {}\n\nYour appeal text:\n{}",
        appeal.appeal_type, appeal.id, appeal.text
    )
}

pub fn rejected_for_user(appeal: &Appeal) -> String {
    format!(
        "❌ Your {} appeal has been rejected.\nAppeal ID: {}\n\nYour appeal text:\n{}\n\n\
         You may submit a new appeal if you wish.",
        appeal.appeal_type, appeal.id, appeal.text
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use appeals_types::{AppealStatus, AppealType};
    use chrono::TimeZone;

    fn sample() -> Appeal {
        Appeal {
            id: "abc".into(),
            user_id: 42,
            display_name: "@mallory".into(),
            appeal_type: AppealType::AdminRequest,
            text: "let me help".into(),
            status: AppealStatus::Pending,
            created_at: chrono::Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap(),
        }
    }

    #[test]
    fn test_admin_notice_lists_commands() {
        let text = new_appeal_for_admin(&sample());
        assert!(text.starts_with("🚨 New Appeal abc\nUser: @mallory (ID: 42)\nType: Admin\n"));
        assert!(text.contains("Time: 2024-05-01 12:30:00"));
        assert!(text.contains("Use /approve abc to approve"));
        assert!(text.contains("Use /reject abc to reject"));
    }

    #[test]
    fn test_user_notices_quote_appeal() {
        let approved = approved_for_user(&sample());
        assert!(approved.starts_with("🎉 Your admin appeal has been approved!"));
        assert!(approved.ends_with("let me help"));

        let rejected = rejected_for_user(&sample());
        assert!(rejected.contains("Appeal ID: abc"));
        assert!(rejected.ends_with("You may submit a new appeal if you wish."));
    }
}

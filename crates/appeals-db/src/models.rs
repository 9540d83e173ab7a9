//! Database row types. These map directly to SQLite rows and stay
//! stringly-typed; the workflow layer converts them into `appeals_types`.

#[derive(Debug, Clone)]
pub struct AppealRow {
    pub id: String,
    pub user_id: i64,
    pub display_name: String,
    pub appeal_type: String,
    pub appeal_text: String,
    pub status: String,
    pub created_at: String,
}

/// Fields supplied by the caller when inserting an appeal.
/// The status column is not settable here: new appeals are always pending.
pub struct NewAppeal<'a> {
    pub id: &'a str,
    pub user_id: i64,
    pub display_name: &'a str,
    pub appeal_type: &'a str,
    pub appeal_text: &'a str,
    pub created_at: &'a str,
}

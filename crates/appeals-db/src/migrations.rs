use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);"
    )?;

    let version: i64 = conn
        .query_row("SELECT COALESCE(MAX(version), 0) FROM schema_version", [], |r| r.get(0))?;

    if version < 1 {
        info!("Running migration v1 (appeals)");
        conn.execute_batch(
            "
            CREATE TABLE appeals (
                id              TEXT PRIMARY KEY,
                user_id         INTEGER NOT NULL,
                display_name    TEXT NOT NULL,
                appeal_type     TEXT NOT NULL CHECK (appeal_type IN ('unban', 'admin')),
                appeal_text     TEXT NOT NULL,
                status          TEXT NOT NULL DEFAULT 'pending'
                                CHECK (status IN ('pending', 'approved', 'rejected')),
                created_at      TEXT NOT NULL
            );

            CREATE INDEX idx_appeals_user ON appeals(user_id);
            CREATE INDEX idx_appeals_status ON appeals(status, created_at);
            CREATE INDEX idx_appeals_type ON appeals(appeal_type);
            CREATE INDEX idx_appeals_created ON appeals(created_at);

            INSERT INTO schema_version (version) VALUES (1);
            ",
        )?;
    }

    info!("Database migrations complete");
    Ok(())
}

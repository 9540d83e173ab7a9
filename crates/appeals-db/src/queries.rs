use crate::models::{AppealRow, NewAppeal};
use crate::Database;
use anyhow::Result;
use rusqlite::{Connection, Row};

const APPEAL_COLUMNS: &str =
    "id, user_id, display_name, appeal_type, appeal_text, status, created_at";

impl Database {
    /// Insert a new appeal in `pending`. Returns the stored id.
    pub fn create_appeal(&self, appeal: &NewAppeal<'_>) -> Result<String> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO appeals (id, user_id, display_name, appeal_type, appeal_text, status, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, 'pending', ?6)",
                rusqlite::params![
                    appeal.id,
                    appeal.user_id,
                    appeal.display_name,
                    appeal.appeal_type,
                    appeal.appeal_text,
                    appeal.created_at,
                ],
            )?;
            Ok(appeal.id.to_string())
        })
    }

    pub fn get_appeal(&self, id: &str) -> Result<Option<AppealRow>> {
        self.with_conn(|conn| query_appeal_by_id(conn, id))
    }

    /// Newest pending appeals first, at most `limit` of them.
    pub fn list_pending(&self, limit: u32) -> Result<Vec<AppealRow>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {APPEAL_COLUMNS} FROM appeals
                 WHERE status = 'pending'
                 ORDER BY created_at DESC, rowid DESC
                 LIMIT ?1"
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([limit], map_appeal_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Compare-and-set on the status column.
    ///
    /// Moves the appeal to `new_status` only if its stored status is still
    /// `expected`, then re-reads it under the same lock. Returns `None` when
    /// no row matched both the id and the expected status.
    pub fn transition_status(
        &self,
        id: &str,
        expected: &str,
        new_status: &str,
    ) -> Result<Option<AppealRow>> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE appeals SET status = ?3 WHERE id = ?1 AND status = ?2",
                (id, expected, new_status),
            )?;
            if changed == 0 {
                return Ok(None);
            }
            query_appeal_by_id(conn, id)
        })
    }

    // -- Reporting --

    pub fn count_all(&self) -> Result<u64> {
        self.with_conn(|conn| {
            let n: i64 = conn.query_row("SELECT COUNT(*) FROM appeals", [], |r| r.get(0))?;
            Ok(n as u64)
        })
    }

    pub fn count_by_status(&self, status: &str) -> Result<u64> {
        self.with_conn(|conn| {
            let n: i64 = conn.query_row(
                "SELECT COUNT(*) FROM appeals WHERE status = ?1",
                [status],
                |r| r.get(0),
            )?;
            Ok(n as u64)
        })
    }

    /// (appeal_type, count) pairs for every type that has at least one appeal.
    pub fn count_by_type(&self) -> Result<Vec<(String, u64)>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT appeal_type, COUNT(*) FROM appeals GROUP BY appeal_type ORDER BY appeal_type",
            )?;
            let rows = stmt
                .query_map([], |row| {
                    Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)? as u64))
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Appeals created at or after `cutoff` (a formatted timestamp).
    pub fn count_created_since(&self, cutoff: &str) -> Result<u64> {
        self.with_conn(|conn| {
            let n: i64 = conn.query_row(
                "SELECT COUNT(*) FROM appeals WHERE created_at >= ?1",
                [cutoff],
                |r| r.get(0),
            )?;
            Ok(n as u64)
        })
    }
}

fn query_appeal_by_id(conn: &Connection, id: &str) -> Result<Option<AppealRow>> {
    let sql = format!("SELECT {APPEAL_COLUMNS} FROM appeals WHERE id = ?1");
    let mut stmt = conn.prepare(&sql)?;
    let row = stmt.query_row([id], map_appeal_row).optional()?;
    Ok(row)
}

fn map_appeal_row(row: &Row<'_>) -> rusqlite::Result<AppealRow> {
    Ok(AppealRow {
        id: row.get(0)?,
        user_id: row.get(1)?,
        display_name: row.get(2)?,
        appeal_type: row.get(3)?,
        appeal_text: row.get(4)?,
        status: row.get(5)?,
        created_at: row.get(6)?,
    })
}

/// Extension trait for optional query results
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

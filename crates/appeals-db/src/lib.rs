pub mod migrations;
pub mod models;
pub mod queries;

use anyhow::Result;
use chrono::{DateTime, NaiveDateTime, Utc};
use rusqlite::Connection;
use std::path::Path;
use std::sync::Mutex;
use tracing::info;

/// Fixed-width UTC timestamps so that text order is chronological order.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;

        // WAL mode for concurrent reads
        conn.pragma_update(None, "journal_mode", "WAL")?;

        migrations::run(&conn)?;

        info!("Database opened at {}", path.display());
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Private database that lives as long as this handle. Used by tests.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        migrations::run(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Run `f` while holding the connection lock. Everything inside `f`
    /// is serialized against every other store call.
    pub fn with_conn<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let conn = self.conn.lock().map_err(|e| anyhow::anyhow!("DB lock poisoned: {}", e))?;
        f(&conn)
    }
}

pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    // SQLite's datetime('now') has no fractional part; %.f accepts both.
    let naive = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f")?;
    Ok(naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_timestamp_roundtrip_keeps_micros() {
        let ts = Utc.with_ymd_and_hms(2024, 3, 9, 7, 5, 1).unwrap()
            + chrono::Duration::microseconds(42);
        let raw = format_timestamp(ts);
        assert_eq!(raw, "2024-03-09 07:05:01.000042");
        assert_eq!(parse_timestamp(&raw).unwrap(), ts);
    }

    #[test]
    fn test_parse_sqlite_default_timestamp() {
        let ts = parse_timestamp("2024-03-09 07:05:01").unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2024, 3, 9, 7, 5, 1).unwrap());
    }

    #[test]
    fn test_timestamps_sort_lexically() {
        let earlier = Utc.with_ymd_and_hms(2024, 1, 9, 23, 59, 59).unwrap();
        let later = Utc.with_ymd_and_hms(2024, 1, 10, 0, 0, 0).unwrap();
        assert!(format_timestamp(earlier) < format_timestamp(later));
    }
}

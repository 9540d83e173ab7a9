use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use appeals_telegram::client::{DEFAULT_API_URL, TelegramOptions};
use appeals_workflow::WorkflowConfig;

/// Every problem found in the environment, one per line.
#[derive(Debug, Error)]
#[error("{}", .0.join("\n"))]
pub struct ConfigError(pub Vec<String>);

#[derive(Debug, Clone)]
pub struct Config {
    pub bot_token: String,
    pub admin_ids: Vec<i64>,
    pub db_path: PathBuf,
    pub api_url: String,
    pub poll_timeout_secs: u64,
    pub pending_limit: u32,
    pub draft_ttl: Duration,
    pub draft_capacity: usize,
    pub health_addr: Option<SocketAddr>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let mut errors = Vec::new();

        let bot_token = get("BOT_TOKEN").unwrap_or_default();
        if bot_token.is_empty() {
            errors.push("BOT_TOKEN is required in environment variables".to_string());
        } else if !bot_token.contains(':') {
            errors.push("BOT_TOKEN appears to be invalid".to_string());
        }

        // ADMIN_ID is the single-admin spelling; both may be given.
        let raw_admins: Vec<String> = ["ADMIN_IDS", "ADMIN_ID"]
            .iter()
            .filter_map(|key| get(*key))
            .flat_map(|v| v.split(',').map(|s| s.trim().to_string()).collect::<Vec<_>>())
            .filter(|s| !s.is_empty())
            .collect();
        let mut admin_ids = Vec::new();
        if raw_admins.is_empty() {
            errors.push("ADMIN_IDS (or ADMIN_ID) is required in environment variables".to_string());
        }
        for raw in raw_admins {
            match raw.parse::<i64>() {
                Ok(id) => admin_ids.push(id),
                Err(_) => errors.push(format!("admin id '{}' must be a valid numeric ID", raw)),
            }
        }

        let mut number = |key: &str, default: u64| -> u64 {
            match get(key) {
                None => default,
                Some(v) => v.parse().unwrap_or_else(|_| {
                    errors.push(format!("{} must be a non-negative integer, got '{}'", key, v));
                    default
                }),
            }
        };
        let poll_timeout_secs = number("POLL_TIMEOUT_SECS", 30);
        let pending_limit = number("PENDING_LIMIT", 50).min(u32::MAX as u64) as u32;
        let draft_ttl = Duration::from_secs(number("DRAFT_TTL_SECS", 3600));
        let draft_capacity = number("DRAFT_CAPACITY", 10_000) as usize;

        let health_addr = match get("HEALTH_ADDR") {
            None => None,
            Some(v) => match v.parse::<SocketAddr>() {
                Ok(addr) => Some(addr),
                Err(_) => {
                    errors.push(format!("HEALTH_ADDR '{}' is not a socket address", v));
                    None
                }
            },
        };

        if !errors.is_empty() {
            return Err(ConfigError(errors));
        }

        Ok(Self {
            bot_token,
            admin_ids,
            db_path: get("DB_PATH").unwrap_or_else(|| "appeals.db".into()).into(),
            api_url: get("TELEGRAM_API_URL").unwrap_or_else(|| DEFAULT_API_URL.into()),
            poll_timeout_secs,
            pending_limit,
            draft_ttl,
            draft_capacity,
            health_addr,
        })
    }

    pub fn telegram(&self) -> TelegramOptions {
        TelegramOptions {
            token: self.bot_token.clone(),
            api_url: self.api_url.clone(),
            poll_timeout_secs: self.poll_timeout_secs,
        }
    }

    pub fn workflow(&self) -> WorkflowConfig {
        WorkflowConfig {
            pending_limit: self.pending_limit,
            draft_ttl: self.draft_ttl,
            draft_capacity: self.draft_capacity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config = load(&[("BOT_TOKEN", "123:abc"), ("ADMIN_ID", "42")]).unwrap();
        assert_eq!(config.admin_ids, vec![42]);
        assert_eq!(config.db_path, PathBuf::from("appeals.db"));
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.pending_limit, 50);
        assert_eq!(config.poll_timeout_secs, 30);
        assert_eq!(config.draft_ttl, Duration::from_secs(3600));
        assert!(config.health_addr.is_none());
    }

    #[test]
    fn test_admin_lists_are_merged() {
        let config = load(&[
            ("BOT_TOKEN", "123:abc"),
            ("ADMIN_IDS", "1, 2,,3"),
            ("ADMIN_ID", "4"),
        ])
        .unwrap();
        assert_eq!(config.admin_ids, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_all_errors_reported_together() {
        let err = load(&[
            ("BOT_TOKEN", "no-colon"),
            ("ADMIN_IDS", "abc"),
            ("PENDING_LIMIT", "-5"),
            ("HEALTH_ADDR", "nowhere"),
        ])
        .unwrap_err();
        assert_eq!(err.0.len(), 4);
        let text = err.to_string();
        assert!(text.contains("BOT_TOKEN appears to be invalid"));
        assert!(text.contains("admin id 'abc'"));
        assert!(text.contains("PENDING_LIMIT"));
        assert!(text.contains("HEALTH_ADDR"));
    }

    #[test]
    fn test_missing_required() {
        let err = load(&[("BOT_TOKEN", "   ")]).unwrap_err();
        assert_eq!(err.0.len(), 2);
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("BOT_TOKEN", "123:abc"),
            ("ADMIN_IDS", "7"),
            ("DB_PATH", "/var/lib/appeals/appeals.db"),
            ("DRAFT_CAPACITY", "5"),
            ("HEALTH_ADDR", "127.0.0.1:8080"),
        ])
        .unwrap();
        assert_eq!(config.workflow().draft_capacity, 5);
        assert_eq!(config.telegram().token, "123:abc");
        assert_eq!(config.health_addr, Some("127.0.0.1:8080".parse().unwrap()));
    }
}

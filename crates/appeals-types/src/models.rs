use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A string that does not name any variant of an appeal enum.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind}: {value}")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AppealType {
    #[serde(rename = "unban")]
    Unban,
    #[serde(rename = "admin")]
    AdminRequest,
}

impl AppealType {
    pub const ALL: [AppealType; 2] = [AppealType::Unban, AppealType::AdminRequest];

    /// Storage and callback-data name.
    pub fn as_str(self) -> &'static str {
        match self {
            AppealType::Unban => "unban",
            AppealType::AdminRequest => "admin",
        }
    }

    /// Capitalized label used in chat messages.
    pub fn label(self) -> &'static str {
        match self {
            AppealType::Unban => "Unban",
            AppealType::AdminRequest => "Admin",
        }
    }
}

impl fmt::Display for AppealType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AppealType {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "unban" => Ok(AppealType::Unban),
            "admin" => Ok(AppealType::AdminRequest),
            other => Err(UnknownVariant {
                kind: "appeal type",
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppealStatus {
    Pending,
    Approved,
    Rejected,
}

impl AppealStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            AppealStatus::Pending => "pending",
            AppealStatus::Approved => "approved",
            AppealStatus::Rejected => "rejected",
        }
    }

    pub fn is_terminal(self) -> bool {
        !matches!(self, AppealStatus::Pending)
    }
}

impl fmt::Display for AppealStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AppealStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(AppealStatus::Pending),
            "approved" => Ok(AppealStatus::Approved),
            "rejected" => Ok(AppealStatus::Rejected),
            other => Err(UnknownVariant {
                kind: "appeal status",
                value: other.to_string(),
            }),
        }
    }
}

/// A user's unban or admin-status request.
/// Everything except `status` is fixed when the appeal is submitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Appeal {
    pub id: String,
    pub user_id: i64,
    pub display_name: String,
    pub appeal_type: AppealType,
    pub text: String,
    pub status: AppealStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppealStats {
    pub total: u64,
    pub pending: u64,
    pub approved: u64,
    pub rejected: u64,
    pub by_type: BTreeMap<AppealType, u64>,
    pub last_24h: u64,
    pub last_7d: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_appeal_type_names() {
        for ty in AppealType::ALL {
            assert_eq!(ty.as_str().parse::<AppealType>().unwrap(), ty);
        }
        assert_eq!(AppealType::AdminRequest.label(), "Admin");
        assert!("adminRequest".parse::<AppealType>().is_err());
    }

    #[test]
    fn test_unknown_status_is_rejected() {
        let err = "archived".parse::<AppealStatus>().unwrap_err();
        assert_eq!(err.kind, "appeal status");
        assert_eq!(err.value, "archived");
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(!AppealStatus::Pending.is_terminal());
        assert!(AppealStatus::Approved.is_terminal());
        assert!(AppealStatus::Rejected.is_terminal());
    }

    #[test]
    fn test_stats_serialize_type_keys_by_name() {
        let mut stats = AppealStats::default();
        stats.by_type.insert(AppealType::AdminRequest, 3);
        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["by_type"]["admin"], 3);
    }
}

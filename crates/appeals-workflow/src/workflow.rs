use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{error, info, warn};
use uuid::Uuid;

use appeals_db::Database;
use appeals_db::models::{AppealRow, NewAppeal};
use appeals_types::{Appeal, AppealStats, AppealStatus, AppealType};

use crate::auth::AdminSet;
use crate::drafts::DraftCache;
use crate::error::{AppealError, AppealResult};
use crate::notices;
use crate::notifier::Notifier;

#[derive(Debug, Clone)]
pub struct WorkflowConfig {
    /// Upper bound on appeals returned by `list_pending`.
    pub pending_limit: u32,
    pub draft_ttl: Duration,
    pub draft_capacity: usize,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            pending_limit: 50,
            draft_ttl: Duration::from_secs(3600),
            draft_capacity: 10_000,
        }
    }
}

/// Outcome of an approve/reject call. The status change is committed
/// whether or not the submitter could be told about it.
#[derive(Debug, Clone)]
pub struct Decision {
    pub appeal: Appeal,
    pub user_notified: bool,
}

/// Appeal lifecycle: submission, review and notification.
pub struct Workflow {
    db: Arc<Database>,
    notifier: Arc<dyn Notifier>,
    admins: AdminSet,
    drafts: DraftCache,
    pending_limit: u32,
}

impl Workflow {
    pub fn new(
        db: Arc<Database>,
        notifier: Arc<dyn Notifier>,
        admins: AdminSet,
        config: WorkflowConfig,
    ) -> Self {
        Self {
            db,
            notifier,
            admins,
            drafts: DraftCache::new(config.draft_ttl, config.draft_capacity),
            pending_limit: config.pending_limit,
        }
    }

    pub fn is_admin(&self, user_id: i64) -> bool {
        self.admins.contains(user_id)
    }

    // -- Submission --

    /// Record a new pending appeal and tell the administrators about it.
    pub async fn submit(
        &self,
        user_id: i64,
        display_name: &str,
        appeal_type: AppealType,
        text: &str,
    ) -> AppealResult<Appeal> {
        if text.trim().is_empty() {
            return Err(AppealError::Validation("appeal text must not be empty".into()));
        }

        let display_name = match display_name.trim() {
            "" => format!("user {}", user_id),
            name => name.to_string(),
        };
        let appeal = Appeal {
            id: Uuid::new_v4().to_string(),
            user_id,
            display_name,
            appeal_type,
            text: text.to_string(),
            status: AppealStatus::Pending,
            created_at: Utc::now(),
        };

        let row = appeal.clone();
        self.blocking(move |db| {
            let created_at = appeals_db::format_timestamp(row.created_at);
            db.create_appeal(&NewAppeal {
                id: &row.id,
                user_id: row.user_id,
                display_name: &row.display_name,
                appeal_type: row.appeal_type.as_str(),
                appeal_text: &row.text,
                created_at: &created_at,
            })
        })
        .await?;

        info!("Appeal {} submitted by user {}", appeal.id, user_id);

        let notice = notices::new_appeal_for_admin(&appeal);
        for admin in self.admins.iter() {
            self.deliver(admin, &notice).await;
        }

        Ok(appeal)
    }

    /// Remember which kind of appeal `user_id` is about to write.
    /// `raw_type` is the name picked in the chat ("unban" or "admin").
    pub async fn begin_draft(&self, user_id: i64, raw_type: &str) -> AppealResult<AppealType> {
        let appeal_type: AppealType = raw_type
            .parse()
            .map_err(|e: appeals_types::UnknownVariant| AppealError::Validation(e.to_string()))?;
        self.drafts.begin(user_id, appeal_type).await;
        info!("User {} selected {} appeal type", user_id, appeal_type);
        Ok(appeal_type)
    }

    /// Submit `text` against the user's open draft.
    ///
    /// Returns `Ok(None)` when the user has no draft. The draft is cleared
    /// only once the appeal is stored, so a failed attempt can be retried.
    pub async fn submit_draft(
        &self,
        user_id: i64,
        display_name: &str,
        text: &str,
    ) -> AppealResult<Option<Appeal>> {
        let Some(appeal_type) = self.drafts.get(user_id).await else {
            return Ok(None);
        };

        let appeal = self.submit(user_id, display_name, appeal_type, text).await?;
        self.drafts.clear(user_id).await;
        Ok(Some(appeal))
    }

    pub async fn has_draft(&self, user_id: i64) -> bool {
        self.drafts.get(user_id).await.is_some()
    }

    pub async fn prune_drafts(&self) -> usize {
        self.drafts.prune_expired().await
    }

    // -- Review --

    pub async fn approve(&self, caller_id: i64, id: &str) -> AppealResult<Decision> {
        self.decide(caller_id, id, AppealStatus::Approved).await
    }

    pub async fn reject(&self, caller_id: i64, id: &str) -> AppealResult<Decision> {
        self.decide(caller_id, id, AppealStatus::Rejected).await
    }

    async fn decide(
        &self,
        caller_id: i64,
        id: &str,
        target: AppealStatus,
    ) -> AppealResult<Decision> {
        self.authorize(caller_id)?;

        let appeal_id = id.to_string();
        let row = self
            .blocking(move |db| {
                db.transition_status(&appeal_id, AppealStatus::Pending.as_str(), target.as_str())
            })
            .await?
            .ok_or_else(|| AppealError::NotFound(id.to_string()))?;
        let appeal = appeal_from_row(row)?;

        info!("Appeal {} {} by admin {}", appeal.id, target, caller_id);

        let notice = match target {
            AppealStatus::Rejected => notices::rejected_for_user(&appeal),
            _ => notices::approved_for_user(&appeal),
        };
        let user_notified = self.deliver(appeal.user_id, &notice).await;
        if user_notified {
            info!("User {} notified about {} appeal {}", appeal.user_id, target, appeal.id);
        }

        Ok(Decision {
            appeal,
            user_notified,
        })
    }

    pub async fn list_pending(&self, caller_id: i64) -> AppealResult<Vec<Appeal>> {
        self.authorize(caller_id)?;

        let limit = self.pending_limit;
        let rows = self.blocking(move |db| db.list_pending(limit)).await?;
        let appeals = rows
            .into_iter()
            .map(appeal_from_row)
            .collect::<AppealResult<Vec<_>>>()?;

        info!("Admin {} viewed pending appeals", caller_id);
        Ok(appeals)
    }

    pub async fn get_detail(&self, caller_id: i64, id: &str) -> AppealResult<Appeal> {
        self.authorize(caller_id)?;

        let appeal_id = id.to_string();
        let row = self
            .blocking(move |db| db.get_appeal(&appeal_id))
            .await?
            .ok_or_else(|| AppealError::NotFound(id.to_string()))?;

        info!("Admin {} viewed appeal {}", caller_id, id);
        appeal_from_row(row)
    }

    pub async fn get_stats(&self, caller_id: i64) -> AppealResult<AppealStats> {
        self.authorize(caller_id)?;

        let now = Utc::now();
        let day_ago = appeals_db::format_timestamp(now - chrono::Duration::days(1));
        let week_ago = appeals_db::format_timestamp(now - chrono::Duration::days(7));

        let (total, pending, approved, rejected, by_type, last_24h, last_7d) = self
            .blocking(move |db| {
                Ok((
                    db.count_all()?,
                    db.count_by_status(AppealStatus::Pending.as_str())?,
                    db.count_by_status(AppealStatus::Approved.as_str())?,
                    db.count_by_status(AppealStatus::Rejected.as_str())?,
                    db.count_by_type()?,
                    db.count_created_since(&day_ago)?,
                    db.count_created_since(&week_ago)?,
                ))
            })
            .await?;

        let mut stats = AppealStats {
            total,
            pending,
            approved,
            rejected,
            last_24h,
            last_7d,
            ..Default::default()
        };
        for (raw, count) in by_type {
            match raw.parse::<AppealType>() {
                Ok(ty) => {
                    stats.by_type.insert(ty, count);
                }
                Err(e) => warn!("Skipping corrupt appeal type in stats: {}", e),
            }
        }

        info!("Admin {} viewed statistics", caller_id);
        Ok(stats)
    }

    /// Pending appeal count for health reporting. Not access controlled.
    pub async fn pending_count(&self) -> AppealResult<u64> {
        self.blocking(|db| db.count_by_status(AppealStatus::Pending.as_str()))
            .await
    }

    // -- Helpers --

    fn authorize(&self, caller_id: i64) -> AppealResult<()> {
        self.admins.require(caller_id).inspect_err(|_| {
            warn!("Access denied for user {}", caller_id);
        })
    }

    /// Returns whether the message was delivered. Failures are only logged.
    async fn deliver(&self, target: i64, message: &str) -> bool {
        match self.notifier.notify(target, message).await {
            Ok(()) => true,
            Err(e) => {
                error!("{}", e);
                false
            }
        }
    }

    /// Run a store call off the async runtime.
    async fn blocking<F, T>(&self, f: F) -> AppealResult<T>
    where
        F: FnOnce(&Database) -> anyhow::Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let db = self.db.clone();
        tokio::task::spawn_blocking(move || f(&db))
            .await
            .map_err(|e| {
                error!("spawn_blocking join error: {}", e);
                AppealError::Storage(e.to_string())
            })?
            .map_err(|e| {
                error!("Database error: {}", e);
                AppealError::from(e)
            })
    }
}

fn appeal_from_row(row: AppealRow) -> AppealResult<Appeal> {
    let corrupt = |field: &str, detail: String| {
        AppealError::Storage(format!("corrupt {} on appeal '{}': {}", field, row.id, detail))
    };

    let appeal_type = row
        .appeal_type
        .parse()
        .map_err(|e: appeals_types::UnknownVariant| corrupt("appeal_type", e.to_string()))?;
    let status = row
        .status
        .parse()
        .map_err(|e: appeals_types::UnknownVariant| corrupt("status", e.to_string()))?;
    let created_at = appeals_db::parse_timestamp(&row.created_at)
        .map_err(|e| corrupt("created_at", e.to_string()))?;

    Ok(Appeal {
        id: row.id,
        user_id: row.user_id,
        display_name: row.display_name,
        appeal_type,
        text: row.appeal_text,
        status,
        created_at,
    })
}

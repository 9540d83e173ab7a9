use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

use appeals_types::AppealType;

#[derive(Debug, Clone, Copy)]
struct Draft {
    appeal_type: AppealType,
    started_at: Instant,
}

/// Per-user appeal type chosen but not yet submitted.
///
/// Bounded in both directions: entries older than `ttl` are treated as gone,
/// and once `capacity` users hold a draft the oldest one is evicted to make
/// room. Process-local; nothing survives a restart.
pub struct DraftCache {
    drafts: Mutex<HashMap<i64, Draft>>,
    ttl: Duration,
    capacity: usize,
}

impl DraftCache {
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        Self {
            drafts: Mutex::new(HashMap::new()),
            ttl,
            capacity: capacity.max(1),
        }
    }

    /// Start (or restart) a draft for `user_id`, replacing any previous one.
    pub async fn begin(&self, user_id: i64, appeal_type: AppealType) {
        let now = Instant::now();
        let mut drafts = self.drafts.lock().await;
        drafts.retain(|_, d| !is_expired(d, now, self.ttl));

        if !drafts.contains_key(&user_id) && drafts.len() >= self.capacity {
            let oldest = drafts
                .iter()
                .min_by_key(|(_, d)| d.started_at)
                .map(|(&uid, _)| uid);
            if let Some(uid) = oldest {
                drafts.remove(&uid);
            }
        }

        drafts.insert(
            user_id,
            Draft {
                appeal_type,
                started_at: now,
            },
        );
    }

    /// The live draft for `user_id`, if any. Expired drafts are dropped here.
    pub async fn get(&self, user_id: i64) -> Option<AppealType> {
        let now = Instant::now();
        let mut drafts = self.drafts.lock().await;
        match drafts.get(&user_id) {
            Some(d) if is_expired(d, now, self.ttl) => {
                drafts.remove(&user_id);
                None
            }
            Some(d) => Some(d.appeal_type),
            None => None,
        }
    }

    /// Returns true if a draft was removed.
    pub async fn clear(&self, user_id: i64) -> bool {
        self.drafts.lock().await.remove(&user_id).is_some()
    }

    /// Drop every expired draft. Returns how many were removed.
    pub async fn prune_expired(&self) -> usize {
        let now = Instant::now();
        let mut drafts = self.drafts.lock().await;
        let before = drafts.len();
        drafts.retain(|_, d| !is_expired(d, now, self.ttl));
        before - drafts.len()
    }

    pub async fn len(&self) -> usize {
        self.drafts.lock().await.len()
    }
}

fn is_expired(draft: &Draft, now: Instant, ttl: Duration) -> bool {
    now.duration_since(draft.started_at) >= ttl
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_begin_overwrites_previous_draft() {
        let cache = DraftCache::new(Duration::from_secs(60), 10);
        cache.begin(1, AppealType::Unban).await;
        cache.begin(1, AppealType::AdminRequest).await;

        assert_eq!(cache.get(1).await, Some(AppealType::AdminRequest));
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_clear() {
        let cache = DraftCache::new(Duration::from_secs(60), 10);
        cache.begin(1, AppealType::Unban).await;

        assert!(cache.clear(1).await);
        assert!(!cache.clear(1).await);
        assert_eq!(cache.get(1).await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drafts_expire_after_ttl() {
        let cache = DraftCache::new(Duration::from_secs(60), 10);
        cache.begin(1, AppealType::Unban).await;

        tokio::time::advance(Duration::from_secs(59)).await;
        assert_eq!(cache.get(1).await, Some(AppealType::Unban));

        tokio::time::advance(Duration::from_secs(1)).await;
        assert_eq!(cache.get(1).await, None);
        assert_eq!(cache.len().await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_prune_expired() {
        let cache = DraftCache::new(Duration::from_secs(10), 10);
        cache.begin(1, AppealType::Unban).await;
        tokio::time::advance(Duration::from_secs(5)).await;
        cache.begin(2, AppealType::Unban).await;
        tokio::time::advance(Duration::from_secs(6)).await;

        assert_eq!(cache.prune_expired().await, 1);
        assert_eq!(cache.get(2).await, Some(AppealType::Unban));
    }

    #[tokio::test(start_paused = true)]
    async fn test_capacity_evicts_oldest() {
        let cache = DraftCache::new(Duration::from_secs(600), 2);
        cache.begin(1, AppealType::Unban).await;
        tokio::time::advance(Duration::from_secs(1)).await;
        cache.begin(2, AppealType::Unban).await;
        tokio::time::advance(Duration::from_secs(1)).await;
        cache.begin(3, AppealType::AdminRequest).await;

        assert_eq!(cache.len().await, 2);
        assert_eq!(cache.get(1).await, None);
        assert_eq!(cache.get(3).await, Some(AppealType::AdminRequest));

        // Restarting an existing draft at capacity does not evict anyone.
        cache.begin(2, AppealType::AdminRequest).await;
        assert_eq!(cache.get(3).await, Some(AppealType::AdminRequest));
    }
}

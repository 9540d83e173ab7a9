use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::workflow::Workflow;

/// Background task that drops abandoned drafts.
///
/// Expired drafts are already invisible to lookups; this only keeps the map
/// from holding them until the next `begin`.
pub async fn run_draft_prune_loop(workflow: Arc<Workflow>, interval_secs: u64) {
    let mut interval = tokio::time::interval(Duration::from_secs(interval_secs.max(1)));

    loop {
        interval.tick().await;

        let count = workflow.prune_drafts().await;
        if count > 0 {
            debug!("Cleanup: pruned {} expired drafts", count);
        }
    }
}

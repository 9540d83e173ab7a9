use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinSet;
use tracing::{error, info, warn};

use crate::api::Update;
use crate::client::TelegramClient;
use crate::router::Router;

const RETRY_DELAY: Duration = Duration::from_secs(5);

/// Long-poll `getUpdates` until `shutdown` flips to true.
///
/// Each batch is grouped by sender: one user's updates run in arrival order,
/// different users run concurrently. The next poll starts once the batch is
/// handled, which also acknowledges it to Telegram through the offset.
pub async fn run_polling(
    client: Arc<TelegramClient>,
    router: Arc<Router>,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut offset = 0i64;
    info!("Polling Telegram for updates");

    loop {
        if *shutdown.borrow() {
            break;
        }

        let batch = tokio::select! {
            _ = shutdown.changed() => break,
            result = client.get_updates(offset) => result,
        };

        let updates = match batch {
            Ok(updates) => updates,
            Err(e) => {
                warn!("getUpdates failed: {}", e);
                tokio::select! {
                    _ = shutdown.changed() => break,
                    _ = tokio::time::sleep(RETRY_DELAY) => continue,
                }
            }
        };

        if let Some(last) = updates.iter().map(|u| u.update_id).max() {
            offset = last + 1;
        }

        let mut tasks = JoinSet::new();
        for (_, user_updates) in group_by_sender(updates) {
            let router = router.clone();
            tasks.spawn(async move {
                for update in user_updates {
                    router.handle_update(update).await;
                }
            });
        }
        while let Some(joined) = tasks.join_next().await {
            if let Err(e) = joined {
                error!("Update handler panicked: {}", e);
            }
        }
    }

    // The last handled batch is only acknowledged by the next getUpdates.
    if offset > 0 {
        if let Err(e) = client.confirm_updates(offset).await {
            warn!("Failed to confirm updates before shutdown: {}", e);
        }
    }

    info!("Polling stopped");
}

/// Updates without a known sender share one bucket.
fn group_by_sender(updates: Vec<Update>) -> BTreeMap<Option<i64>, Vec<Update>> {
    let mut groups: BTreeMap<Option<i64>, Vec<Update>> = BTreeMap::new();
    for update in updates {
        groups.entry(update.sender_id()).or_default().push(update);
    }
    groups
}

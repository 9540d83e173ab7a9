mod config;
mod health;

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{error, info};

use appeals_db::Database;
use appeals_telegram::{BotApi, Router, TelegramClient, TelegramNotifier};
use appeals_workflow::{AdminSet, Workflow};

use crate::config::Config;

const DEFAULT_LOG_FILTER: &str = "appeals=debug,appeals_server=debug,tower_http=info";

/// How often abandoned drafts are swept.
const DRAFT_PRUNE_INTERVAL_SECS: u64 = 300;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Configuration error:\n{}", e);
            std::process::exit(1);
        }
    };

    // Init database
    let db = Arc::new(Database::open(&config.db_path)?);

    // Telegram
    let client = Arc::new(TelegramClient::new(config.telegram())?);
    let me = client.get_me().await?;
    info!(
        "Authorized as @{} (id {})",
        me.username.as_deref().unwrap_or("unknown"),
        me.id
    );
    let api: Arc<dyn BotApi> = client.clone();

    // Workflow
    let admins = AdminSet::new(config.admin_ids.iter().copied());
    info!("{} administrator(s) configured", admins.len());
    let notifier = Arc::new(TelegramNotifier::new(api.clone()));
    let workflow = Arc::new(Workflow::new(db, notifier, admins, config.workflow()));
    let router = Arc::new(Router::new(workflow.clone(), api).with_bot_username(me.username.clone()));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        shutdown_signal().await;
        let _ = shutdown_tx.send(true);
    });

    // Background draft cleanup
    tokio::spawn(appeals_workflow::cleanup::run_draft_prune_loop(
        workflow.clone(),
        DRAFT_PRUNE_INTERVAL_SECS,
    ));

    let health = config.health_addr.map(|addr| {
        let workflow = workflow.clone();
        let shutdown = shutdown_rx.clone();
        tokio::spawn(async move {
            if let Err(e) = health::serve(addr, workflow, shutdown).await {
                error!("Health endpoint failed: {}", e);
            }
        })
    });

    info!("Appeals bot started");
    appeals_telegram::poller::run_polling(client, router, shutdown_rx).await;

    if let Some(handle) = health {
        handle.await.ok();
    }

    info!("Appeals bot stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();
    #[cfg(unix)]
    {
        let mut sigterm =
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(sigterm) => sigterm,
                Err(e) => {
                    error!("Failed to install SIGTERM handler: {}", e);
                    ctrl_c.await.ok();
                    info!("Received Ctrl+C, shutting down...");
                    return;
                }
            };
        tokio::select! {
            _ = ctrl_c => info!("Received Ctrl+C, shutting down..."),
            _ = sigterm.recv() => info!("Received SIGTERM, shutting down..."),
        }
    }
    #[cfg(not(unix))]
    {
        ctrl_c.await.ok();
        info!("Received Ctrl+C, shutting down...");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_log_filter_parses() {
        let filter = tracing_subscriber::EnvFilter::try_new(DEFAULT_LOG_FILTER).unwrap();
        let rendered = filter.to_string();
        assert!(rendered.contains("appeals_server=debug"));
        assert!(rendered.contains("tower_http=info"));
    }
}

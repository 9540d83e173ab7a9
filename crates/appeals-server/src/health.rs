use std::net::SocketAddr;
use std::sync::Arc;

use axum::{Json, Router, extract::State, http::StatusCode, response::IntoResponse, routing::get};
use serde_json::json;
use tokio::sync::watch;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use appeals_workflow::Workflow;

pub fn router(workflow: Arc<Workflow>) -> Router {
    Router::new()
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(workflow)
}

/// Serve `/health` on `addr` until `shutdown` flips to true.
pub async fn serve(
    addr: SocketAddr,
    workflow: Arc<Workflow>,
    mut shutdown: watch::Receiver<bool>,
) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Health endpoint listening on {}", addr);

    axum::serve(listener, router(workflow))
        .with_graceful_shutdown(async move {
            let _ = shutdown.changed().await;
        })
        .await?;

    Ok(())
}

async fn health(State(workflow): State<Arc<Workflow>>) -> impl IntoResponse {
    match workflow.pending_count().await {
        Ok(pending) => (
            StatusCode::OK,
            Json(json!({ "status": "ok", "pending": pending })),
        ),
        Err(e) => {
            error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "error" })),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::Request;
    use serde_json::Value;
    use tower::ServiceExt;

    use appeals_db::Database;
    use appeals_types::AppealType;
    use appeals_workflow::{AdminSet, NotificationError, Notifier, WorkflowConfig};

    struct Silent;

    #[async_trait]
    impl Notifier for Silent {
        async fn notify(&self, _target: i64, _message: &str) -> Result<(), NotificationError> {
            Ok(())
        }
    }

    fn setup() -> (Arc<Workflow>, Arc<Database>) {
        let db = Arc::new(Database::open_in_memory().unwrap());
        let workflow = Workflow::new(
            db.clone(),
            Arc::new(Silent),
            AdminSet::new([1]),
            WorkflowConfig::default(),
        );
        (Arc::new(workflow), db)
    }

    async fn get_health(workflow: Arc<Workflow>) -> (StatusCode, Value) {
        let response = router(workflow)
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_health_reports_pending_count() {
        let (workflow, _db) = setup();
        let (status, body) = get_health(workflow.clone()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "status": "ok", "pending": 0 }));

        workflow
            .submit(7, "alice", AppealType::Unban, "please")
            .await
            .unwrap();
        let (status, body) = get_health(workflow).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "status": "ok", "pending": 1 }));
    }

    #[tokio::test]
    async fn test_health_unavailable_when_store_fails() {
        let (workflow, db) = setup();
        db.with_conn(|conn| {
            conn.execute_batch("DROP TABLE appeals")?;
            Ok(())
        })
        .unwrap();

        let (status, body) = get_health(workflow).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body, json!({ "status": "error" }));
    }
}

//! Polling loop against a local stand-in for the Bot API.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{Json, Router as HttpRouter, extract::State, routing::post};
use serde_json::{Value, json};
use tokio::sync::watch;

use appeals_db::Database;
use appeals_telegram::client::{TelegramClient, TelegramOptions};
use appeals_telegram::{Router, TelegramNotifier, poller};
use appeals_workflow::{AdminSet, Workflow, WorkflowConfig};

struct FakeApi {
    /// `(offset, timeout)` of every getUpdates call, in arrival order.
    requests: Mutex<Vec<(i64, u64)>>,
    shutdown: watch::Sender<bool>,
}

async fn get_updates(State(api): State<Arc<FakeApi>>, Json(body): Json<Value>) -> Json<Value> {
    let offset = body["offset"].as_i64().unwrap_or_default();
    let timeout = body["timeout"].as_u64().unwrap_or_default();
    let call = {
        let mut requests = api.requests.lock().unwrap();
        requests.push((offset, timeout));
        requests.len()
    };

    match call {
        1 => Json(json!({
            "ok": true,
            "result": [{
                "update_id": 5,
                "message": {
                    "message_id": 1,
                    "from": {"id": 42, "is_bot": false, "first_name": "Ann"},
                    "chat": {"id": 42},
                    "text": "hello"
                }
            }]
        })),
        2 => {
            // Shut down while this long poll is still open.
            api.shutdown.send_replace(true);
            tokio::time::sleep(Duration::from_secs(5)).await;
            Json(json!({ "ok": true, "result": [] }))
        }
        _ => Json(json!({ "ok": true, "result": [] })),
    }
}

#[tokio::test]
async fn shutdown_confirms_last_batch() {
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let fake = Arc::new(FakeApi {
        requests: Mutex::new(Vec::new()),
        shutdown: shutdown_tx,
    });
    let app = HttpRouter::new()
        .route("/bottest-token/getUpdates", post(get_updates))
        .with_state(fake.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let client = Arc::new(
        TelegramClient::new(TelegramOptions {
            token: "test-token".into(),
            api_url: format!("http://{addr}"),
            poll_timeout_secs: 1,
        })
        .unwrap(),
    );
    let db = Arc::new(Database::open_in_memory().unwrap());
    let workflow = Arc::new(Workflow::new(
        db,
        Arc::new(TelegramNotifier::new(client.clone())),
        AdminSet::new([1]),
        WorkflowConfig::default(),
    ));
    let router = Arc::new(Router::new(workflow, client.clone()));

    tokio::time::timeout(
        Duration::from_secs(10),
        poller::run_polling(client, router, shutdown_rx),
    )
    .await
    .expect("polling did not stop");

    let requests = fake.requests.lock().unwrap().clone();
    assert_eq!(requests, vec![(0, 1), (6, 1), (6, 0)]);
}

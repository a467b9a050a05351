#![allow(dead_code)]

use std::net::TcpListener;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::Value;

pub type Seen = Arc<Mutex<Vec<String>>>;

async fn connect(State((seen, status)): State<(Seen, StatusCode)>, Json(body): Json<Value>) -> StatusCode {
    let key = body["apiKey"].as_str().unwrap_or_default().to_string();
    seen.lock().unwrap().push(key);
    status
}

/// Fake connect backend answering every POST /api/connect with `status`.
/// Must be called inside a tokio runtime.
pub fn spawn_backend(status: StatusCode) -> (String, Seen) {
    let seen: Seen = Arc::new(Mutex::new(Vec::new()));
    let app = Router::new()
        .route("/api/connect", post(connect))
        .with_state((seen.clone(), status));
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let server = axum::Server::from_tcp(listener).unwrap().serve(app.into_make_service());
    tokio::spawn(server);
    (format!("http://{}/api/connect", addr), seen)
}

/// An address nothing listens on.
pub fn dead_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}/api/connect", addr)
}

pub fn wait_for(mut done: impl FnMut() -> bool) -> bool {
    for _ in 0..100 {
        if done() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(20));
    }
    done()
}

pub async fn wait_for_async(mut done: impl FnMut() -> bool) -> bool {
    for _ in 0..100 {
        if done() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    done()
}

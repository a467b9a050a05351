use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use crate::keys::KeySnapshot;
use crate::result::SendOutcome;
use crate::rotation::NotifyStats;
use crate::session::Session;

#[derive(Debug, Deserialize)]
pub struct AddKeyRequest {
    pub key: String,
}

#[derive(Debug, Deserialize)]
pub struct EnabledRequest {
    pub enabled: bool,
}

#[derive(Debug, Deserialize)]
pub struct SendRequest {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct SendResponse {
    pub success: bool,
    pub outcome: Option<SendOutcome>,
    pub error: Option<String>,
}

pub async fn handle_health(State(session): State<Arc<Session>>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "rotation_active": session.trigger.is_active(),
    }))
}

pub async fn handle_list_keys(State(session): State<Arc<Session>>) -> Json<KeySnapshot> {
    Json(session.store.snapshot())
}

pub async fn handle_add_key(
    State(session): State<Arc<Session>>,
    Json(req): Json<AddKeyRequest>,
) -> Json<KeySnapshot> {
    if !session.store.add(&req.key) {
        debug!("ignored blank api key");
    }
    Json(session.store.snapshot())
}

/// Any index that is not an in-range position, including negative or
/// unparseable ones, leaves the list untouched.
pub async fn handle_remove_key(
    State(session): State<Arc<Session>>,
    Path(raw): Path<String>,
) -> Json<KeySnapshot> {
    match raw.trim().parse::<usize>() {
        Ok(index) => {
            session.store.remove_at(index);
        }
        Err(_) => debug!(index = %raw, "ignored invalid key index"),
    }
    Json(session.store.snapshot())
}

pub async fn handle_set_enabled(
    State(session): State<Arc<Session>>,
    Json(req): Json<EnabledRequest>,
) -> Json<KeySnapshot> {
    session.store.set_enabled(req.enabled);
    Json(session.store.snapshot())
}

pub async fn handle_send(
    State(session): State<Arc<Session>>,
    Json(req): Json<SendRequest>,
) -> Json<SendResponse> {
    if req.message.trim().is_empty() {
        return Json(SendResponse {
            success: false,
            outcome: None,
            error: Some("message required".to_string()),
        });
    }

    let message = req.message;
    let result = tokio::task::spawn_blocking(move || session.send_message(&message)).await;

    match result {
        Ok(outcome) => Json(SendResponse {
            success: outcome.delivered,
            outcome: Some(outcome),
            error: None,
        }),
        Err(err) => Json(SendResponse {
            success: false,
            outcome: None,
            error: Some(err.to_string()),
        }),
    }
}

pub async fn handle_stats(State(session): State<Arc<Session>>) -> Json<NotifyStats> {
    Json(session.notify_stats())
}

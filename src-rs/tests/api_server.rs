mod common;

use std::net::TcpListener;
use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use key_rotator_rs::api::server::RotatorServer;
use key_rotator_rs::keys::{KeySnapshot, KeyStore};
use key_rotator_rs::rotation::{HookRegistry, HttpConnectNotifier, NotifyStats};
use key_rotator_rs::{RotatorConfig, Session};
use reqwest::Client;
use serde_json::{json, Value};

use common::{spawn_backend, wait_for_async, Seen};

struct Harness {
    base: String,
    client: Client,
    connected: Seen,
}

fn start(hooks: HookRegistry) -> Harness {
    let (connect_url, connected) = spawn_backend(StatusCode::OK);
    let config = RotatorConfig {
        connect_url: connect_url.clone(),
        ..RotatorConfig::default()
    };
    let notifier = Arc::new(HttpConnectNotifier::new(&connect_url, Duration::from_secs(5)).unwrap());
    let session = Arc::new(Session::with_parts(config, Arc::new(KeyStore::in_memory()), notifier, hooks));

    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    let server = RotatorServer::new(0, session);
    tokio::spawn(async move { server.serve(listener).await });

    Harness {
        base,
        client: Client::new(),
        connected,
    }
}

impl Harness {
    async fn snapshot(&self, resp: reqwest::Response) -> KeySnapshot {
        assert!(resp.status().is_success());
        resp.json().await.unwrap()
    }

    async fn add(&self, key: &str) -> KeySnapshot {
        let resp = self
            .client
            .post(format!("{}/keys", self.base))
            .json(&json!({"key": key}))
            .send()
            .await
            .unwrap();
        self.snapshot(resp).await
    }

    async fn remove(&self, index: impl std::fmt::Display) -> KeySnapshot {
        let resp = self
            .client
            .delete(format!("{}/keys/{}", self.base, index))
            .send()
            .await
            .unwrap();
        self.snapshot(resp).await
    }

    async fn enable(&self, enabled: bool) -> KeySnapshot {
        let resp = self
            .client
            .put(format!("{}/enabled", self.base))
            .json(&json!({"enabled": enabled}))
            .send()
            .await
            .unwrap();
        self.snapshot(resp).await
    }

    async fn send(&self, message: &str) -> Value {
        self.client
            .post(format!("{}/messages", self.base))
            .json(&json!({"message": message}))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap()
    }

    async fn stats(&self) -> NotifyStats {
        self.client
            .get(format!("{}/stats", self.base))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap()
    }
}

#[tokio::test]
async fn settings_surface_edits_keys() {
    let h = start(HookRegistry::new());

    h.add("k1").await;
    h.add("   ").await;
    let snapshot = h.add(" k2 ").await;
    assert_eq!(snapshot.keys, vec!["k1", "k2"]);
    assert_eq!(snapshot.current_index, 0);
    assert!(!snapshot.enabled);

    let snapshot = h.remove(-1).await;
    assert_eq!(snapshot.keys, vec!["k1", "k2"]);
    let snapshot = h.remove(5).await;
    assert_eq!(snapshot.keys, vec!["k1", "k2"]);
    let snapshot = h.remove("99999999999999999999").await;
    assert_eq!(snapshot.keys, vec!["k1", "k2"]);
    let snapshot = h.remove("first").await;
    assert_eq!(snapshot.keys, vec!["k1", "k2"]);
    let snapshot = h.remove(0).await;
    assert_eq!(snapshot.keys, vec!["k2"]);

    let raw: Value = h
        .client
        .get(format!("{}/keys", h.base))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(raw, json!({"keys": ["k2"], "currentIndex": 0, "enabled": false}));
}

#[tokio::test]
async fn sends_rotate_and_notify_backend() {
    let h = start(HookRegistry::new());
    h.add("k1").await;
    h.add("k2").await;
    h.enable(true).await;

    let mut active = Vec::new();
    for text in ["one", "two", "three"] {
        let resp = h.send(text).await;
        assert_eq!(resp["success"], true);
        assert_eq!(resp["outcome"]["message"], text);
        active.push(resp["outcome"]["active_key"].as_str().unwrap().to_string());
    }
    assert_eq!(active, vec!["k2", "k1", "k2"]);

    let connected = h.connected.clone();
    assert!(wait_for_async(|| connected.lock().unwrap().len() == 3).await);
    let mut seen = connected.lock().unwrap().clone();
    seen.sort();
    assert_eq!(seen, vec!["k1", "k2", "k2"]);
    assert_eq!(h.stats().await.succeeded, 3);
}

#[tokio::test]
async fn disabled_rotation_sends_without_key() {
    let h = start(HookRegistry::new());
    h.add("k1").await;

    let resp = h.send("hello").await;
    assert_eq!(resp["success"], true);
    assert!(resp["outcome"]["active_key"].is_null());

    let snapshot = h.enable(false).await;
    assert_eq!(snapshot.current_index, 0);
}

#[tokio::test]
async fn blank_message_is_refused() {
    let h = start(HookRegistry::new());
    let resp = h.send("  ").await;
    assert_eq!(resp["success"], false);
    assert_eq!(resp["error"], "message required");
}

#[tokio::test]
async fn missing_host_hook_keeps_service_up() {
    let h = start(HookRegistry::without_send_hook());
    h.add("k1").await;
    h.add("k2").await;
    h.enable(true).await;

    let health: Value = h
        .client
        .get(format!("{}/health", h.base))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(health["status"], "ok");
    assert_eq!(health["rotation_active"], false);

    let resp = h.send("hello").await;
    assert_eq!(resp["success"], true);
    assert!(resp["outcome"]["active_key"].is_null());
    assert!(h.connected.lock().unwrap().is_empty());
}

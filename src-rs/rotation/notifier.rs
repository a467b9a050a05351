use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::runtime::Handle;
use tracing::{info, warn};

use crate::config::RotatorConfig;
use crate::error::{Result, RotatorError};
use crate::helpers::mask_key;

/// Tells the backend which key is now active. Fire-and-forget: `notify`
/// returns immediately and never reports failure to the caller.
pub trait ConnectNotifier: Send + Sync {
    fn notify(&self, key: Option<&str>);

    fn stats(&self) -> NotifyStats {
        NotifyStats::default()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotifyStats {
    pub succeeded: u64,
    pub failed: u64,
    /// Masked form of the last key a notification completed for.
    pub last_key: Option<String>,
    pub last_outcome_at: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ConnectBody<'a> {
    api_key: &'a str,
}

/// POSTs `{"apiKey": ...}` to the connect endpoint on a detached task.
pub struct HttpConnectNotifier {
    connect_url: String,
    timeout: Duration,
    client: Client,
    stats: Arc<Mutex<NotifyStats>>,
}

impl HttpConnectNotifier {
    pub fn new(connect_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            connect_url: connect_url.to_string(),
            timeout,
            client,
            stats: Arc::new(Mutex::new(NotifyStats::default())),
        })
    }

    pub fn from_config(cfg: &RotatorConfig) -> Result<Self> {
        Self::new(&cfg.connect_url, Duration::from_secs(cfg.connect_timeout_secs))
    }

    /// The request itself, awaited. `notify` runs this detached.
    pub async fn connect(&self, key: &str) -> Result<()> {
        let outcome = post_key(&self.client, &self.connect_url, key).await;
        record(&self.stats, key, outcome.as_ref().map(|_| ()).map_err(ToString::to_string));
        outcome
    }
}

impl ConnectNotifier for HttpConnectNotifier {
    fn notify(&self, key: Option<&str>) {
        let key = match key {
            Some(key) => key.to_string(),
            None => return,
        };
        let url = self.connect_url.clone();
        let stats = Arc::clone(&self.stats);

        match Handle::try_current() {
            Ok(handle) => {
                let client = self.client.clone();
                handle.spawn(async move {
                    let outcome = post_key(&client, &url, &key).await;
                    record(&stats, &key, outcome.map_err(|err| err.to_string()));
                });
            }
            Err(_) => {
                let timeout = self.timeout;
                std::thread::spawn(move || {
                    let outcome = post_key_blocking(&url, &key, timeout);
                    record(&stats, &key, outcome.map_err(|err| err.to_string()));
                });
            }
        }
    }

    fn stats(&self) -> NotifyStats {
        self.stats.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

async fn post_key(client: &Client, url: &str, key: &str) -> Result<()> {
    let resp = client
        .post(url)
        .json(&ConnectBody { api_key: key })
        .send()
        .await?;
    let status = resp.status();
    if status.is_success() {
        Ok(())
    } else {
        Err(RotatorError::ConnectRejected {
            status: status.as_u16(),
        })
    }
}

fn post_key_blocking(url: &str, key: &str, timeout: Duration) -> Result<()> {
    let client = reqwest::blocking::Client::builder().timeout(timeout).build()?;
    let resp = client.post(url).json(&ConnectBody { api_key: key }).send()?;
    let status = resp.status();
    if status.is_success() {
        Ok(())
    } else {
        Err(RotatorError::ConnectRejected {
            status: status.as_u16(),
        })
    }
}

fn record(stats: &Mutex<NotifyStats>, key: &str, outcome: std::result::Result<(), String>) {
    let masked = mask_key(key);
    let mut stats = stats.lock().unwrap_or_else(PoisonError::into_inner);
    match outcome {
        Ok(()) => {
            info!(key = %masked, "connected with new api key");
            stats.succeeded += 1;
            stats.last_error = None;
        }
        Err(err) => {
            warn!(key = %masked, error = %err, "failed to connect api key");
            stats.failed += 1;
            stats.last_error = Some(err);
        }
    }
    stats.last_key = Some(masked);
    stats.last_outcome_at = Some(Utc::now());
}

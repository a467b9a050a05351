use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What the host send path reports back for one message.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SendOutcome {
    pub delivered: bool,
    pub message: String,
    pub active_key: Option<String>,
    pub sent_at: DateTime<Utc>,
}

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug)]
pub struct CLIConfig {
    pub base_url: String,
    pub debug: bool,
}

#[derive(Debug, Serialize)]
pub struct AddKeyRequest {
    pub key: String,
}

#[derive(Debug, Serialize)]
pub struct EnabledRequest {
    pub enabled: bool,
}

#[derive(Debug, Serialize)]
pub struct SendRequest {
    pub message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyListing {
    pub keys: Vec<String>,
    pub current_index: usize,
    pub enabled: bool,
}

#[derive(Debug, Deserialize)]
pub struct SendOutcome {
    pub delivered: bool,
    pub message: String,
    pub active_key: Option<String>,
    pub sent_at: String,
}

#[derive(Debug, Deserialize)]
pub struct SendResponse {
    pub success: bool,
    pub outcome: Option<SendOutcome>,
    pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct NotifyStats {
    pub succeeded: u64,
    pub failed: u64,
    pub last_key: Option<String>,
    pub last_outcome_at: Option<String>,
    pub last_error: Option<String>,
}

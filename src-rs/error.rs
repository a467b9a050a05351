use thiserror::Error;

#[derive(Debug, Error)]
pub enum RotatorError {
    #[error("settings io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("settings serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("connect request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("connect endpoint rejected key: http {status}")]
    ConnectRejected { status: u16 },

    #[error("host exposes no pre-send extension point")]
    MissingHook,

    #[error("pre-send hook already registered: {0}")]
    HookAlreadyRegistered(String),

    #[error("{0} lock poisoned")]
    LockPoisoned(&'static str),

    #[error("invalid config value for {key}: {value}")]
    InvalidConfig { key: String, value: String },
}

pub type Result<T> = std::result::Result<T, RotatorError>;

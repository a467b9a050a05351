use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::RotatorError;
use crate::helpers::{env_bool, env_opt, env_or, env_parse};

/// Where the current-index pointer lands when a removal pushes it past the end.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemovalPolicy {
    #[default]
    WrapToStart,
    ClampToEnd,
}

impl FromStr for RemovalPolicy {
    type Err = RotatorError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_lowercase().as_str() {
            "wrap" | "wrap_to_start" | "start" => Ok(Self::WrapToStart),
            "end" | "clamp" | "clamp_to_end" => Ok(Self::ClampToEnd),
            other => Err(RotatorError::InvalidConfig {
                key: "ROTATOR_REMOVAL_POLICY".to_string(),
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Clone, Debug)]
pub struct RotatorConfig {
    pub settings_path: Option<PathBuf>,
    pub storage_key: String,
    pub connect_url: String,
    pub connect_timeout_secs: u64,
    pub enabled: bool,
    pub removal_policy: RemovalPolicy,
    pub port: u16,
}

impl Default for RotatorConfig {
    fn default() -> Self {
        Self {
            settings_path: None,
            storage_key: "apirotay".to_string(),
            connect_url: "http://127.0.0.1:8000/api/connect".to_string(),
            connect_timeout_secs: 10,
            enabled: false,
            removal_policy: RemovalPolicy::default(),
            port: 8080,
        }
    }
}

impl RotatorConfig {
    pub fn from_env() -> Result<Self, RotatorError> {
        let defaults = Self::default();
        let removal_policy = match env_opt("ROTATOR_REMOVAL_POLICY") {
            Some(raw) => raw.parse()?,
            None => defaults.removal_policy,
        };
        Ok(Self {
            settings_path: env_opt("ROTATOR_SETTINGS_PATH").map(PathBuf::from),
            storage_key: env_or("ROTATOR_STORAGE_KEY", defaults.storage_key),
            connect_url: env_or("ROTATOR_CONNECT_URL", defaults.connect_url),
            connect_timeout_secs: env_parse("ROTATOR_CONNECT_TIMEOUT_SECS", defaults.connect_timeout_secs),
            enabled: env_bool("ROTATOR_ENABLED", defaults.enabled),
            removal_policy,
            port: env_parse("PORT", defaults.port),
        })
    }
}

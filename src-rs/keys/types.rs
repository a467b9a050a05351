use serde::{Deserialize, Serialize};

/// The record stored under the rotator's storage key.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedState {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub api_keys: Vec<String>,
    #[serde(default)]
    pub current_index: usize,
}

/// What a settings panel needs to render: `{ keys, currentIndex, enabled }`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeySnapshot {
    pub keys: Vec<String>,
    pub current_index: usize,
    pub enabled: bool,
}

impl From<KeySnapshot> for PersistedState {
    fn from(snapshot: KeySnapshot) -> Self {
        Self {
            enabled: snapshot.enabled,
            api_keys: snapshot.keys,
            current_index: snapshot.current_index,
        }
    }
}

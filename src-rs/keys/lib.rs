pub mod persist;
pub mod store;
pub mod types;

pub use persist::{JsonFileSettings, MemorySettings, SettingsBackend};
pub use store::{KeyObserver, KeyStore};
pub use types::{KeySnapshot, PersistedState};

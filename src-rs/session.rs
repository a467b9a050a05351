use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use crate::config::RotatorConfig;
use crate::error::Result;
use crate::helpers::load_seed_keys;
use crate::keys::{JsonFileSettings, KeyStore, MemorySettings, SettingsBackend};
use crate::result::SendOutcome;
use crate::rotation::{ConnectNotifier, HookRegistry, HttpConnectNotifier, NotifyStats, OutgoingMessage, RotationTrigger};

/// One running instance of the rotator: the store and everything wired to it.
pub struct Session {
    pub config: RotatorConfig,
    pub store: Arc<KeyStore>,
    pub notifier: Arc<dyn ConnectNotifier>,
    pub hooks: HookRegistry,
    pub trigger: Arc<RotationTrigger>,
}

impl Session {
    pub fn start(config: RotatorConfig) -> Result<Self> {
        Self::start_seeded(config, &load_seed_keys())
    }

    /// Env seed keys and the enabled default only apply to a storage key that
    /// has never been saved; after that the persisted record wins.
    fn start_seeded(config: RotatorConfig, seed_keys: &[String]) -> Result<Self> {
        let backend: Arc<dyn SettingsBackend> = match &config.settings_path {
            Some(path) => Arc::new(JsonFileSettings::new(path)),
            None => Arc::new(MemorySettings::new()),
        };
        let fresh = match backend.load(&config.storage_key) {
            Ok(existing) => existing.is_none(),
            Err(err) => {
                warn!(error = %err, "settings unreadable, treating as fresh");
                true
            }
        };

        let store = Arc::new(KeyStore::open(backend, &config.storage_key, config.removal_policy));
        if fresh {
            let seeded = store.seed_if_empty(seed_keys);
            if seeded > 0 {
                info!(count = seeded, "seeded api keys from environment");
            }
            store.set_enabled(config.enabled);
        }

        let notifier = Arc::new(HttpConnectNotifier::from_config(&config)?);
        Ok(Self::with_parts(config, store, notifier, HookRegistry::new()))
    }

    /// Wires the trigger into `hooks`. A host without a pre-send hook leaves
    /// the session running with rotation switched off.
    pub fn with_parts(
        config: RotatorConfig,
        store: Arc<KeyStore>,
        notifier: Arc<dyn ConnectNotifier>,
        hooks: HookRegistry,
    ) -> Self {
        let trigger = Arc::new(RotationTrigger::new(store.clone(), notifier.clone()));
        trigger.install(&hooks);
        Self {
            config,
            store,
            notifier,
            hooks,
            trigger,
        }
    }

    pub fn send_message(&self, text: &str) -> SendOutcome {
        let message = OutgoingMessage::new(text);
        self.hooks.send(&message, |msg, active_key| SendOutcome {
            delivered: true,
            message: msg.text.clone(),
            active_key: active_key.map(str::to_string),
            sent_at: Utc::now(),
        })
    }

    pub fn notify_stats(&self) -> NotifyStats {
        self.notifier.stats()
    }
}

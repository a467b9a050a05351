use std::sync::{Arc, PoisonError, RwLock};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{Result, RotatorError};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutgoingMessage {
    pub text: String,
}

impl OutgoingMessage {
    pub fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
        }
    }
}

/// Per-send scratch space handed to pre-send hooks. The message itself is
/// read-only; hooks may only record which key the message goes out with.
pub struct SendContext<'a> {
    message: &'a OutgoingMessage,
    active_key: Option<String>,
}

impl SendContext<'_> {
    pub fn message(&self) -> &OutgoingMessage {
        self.message
    }

    pub fn set_active_key(&mut self, key: Option<String>) {
        self.active_key = key;
    }
}

pub type PreSendHook = Arc<dyn Fn(&mut SendContext<'_>) -> Result<()> + Send + Sync>;

/// The host's "message about to be sent" extension point.
pub trait SendHost: Send + Sync {
    fn register_pre_send(&self, name: &str, hook: PreSendHook) -> Result<()>;
}

struct HookEntry {
    name: String,
    hook: PreSendHook,
}

/// In-process host: runs registered hooks before handing the message to the
/// transport.
pub struct HookRegistry {
    supports_pre_send: bool,
    hooks: RwLock<Vec<HookEntry>>,
}

impl Default for HookRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl HookRegistry {
    pub fn new() -> Self {
        Self {
            supports_pre_send: true,
            hooks: RwLock::new(Vec::new()),
        }
    }

    /// A host build that lacks the pre-send extension point.
    pub fn without_send_hook() -> Self {
        Self {
            supports_pre_send: false,
            hooks: RwLock::new(Vec::new()),
        }
    }

    #[cfg(test)]
    fn count(&self) -> usize {
        self.hooks.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    #[cfg(test)]
    fn has(&self, name: &str) -> bool {
        let hooks = self.hooks.read().unwrap_or_else(PoisonError::into_inner);
        hooks.iter().any(|entry| entry.name == name)
    }

    /// Runs every pre-send hook in registration order, then `transmit`.
    /// Hook failures are logged and never block the send; `transmit`'s
    /// return value is passed through untouched.
    pub fn send<R>(
        &self,
        message: &OutgoingMessage,
        transmit: impl FnOnce(&OutgoingMessage, Option<&str>) -> R,
    ) -> R {
        let hooks: Vec<(String, PreSendHook)> = {
            let hooks = self.hooks.read().unwrap_or_else(PoisonError::into_inner);
            hooks
                .iter()
                .map(|entry| (entry.name.clone(), Arc::clone(&entry.hook)))
                .collect()
        };

        let mut ctx = SendContext {
            message,
            active_key: None,
        };
        for (name, hook) in hooks {
            if let Err(err) = hook(&mut ctx) {
                warn!(hook = %name, error = %err, "pre-send hook failed, sending anyway");
            }
        }
        let active_key = ctx.active_key.take();
        transmit(message, active_key.as_deref())
    }
}

impl SendHost for HookRegistry {
    fn register_pre_send(&self, name: &str, hook: PreSendHook) -> Result<()> {
        if !self.supports_pre_send {
            return Err(RotatorError::MissingHook);
        }
        let mut hooks = self
            .hooks
            .write()
            .map_err(|_| RotatorError::LockPoisoned("hooks"))?;
        if hooks.iter().any(|entry| entry.name == name) {
            return Err(RotatorError::HookAlreadyRegistered(name.to_string()));
        }
        hooks.push(HookEntry {
            name: name.to_string(),
            hook,
        });
        Ok(())
    }
}

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, error, info};

use super::hooks::{PreSendHook, SendContext, SendHost};
use super::notifier::ConnectNotifier;
use crate::error::RotatorError;
use crate::helpers::mask_key;
use crate::keys::KeyStore;

/// Rotates to the next key once per outgoing message and tells the
/// notifier about it before the message is transmitted.
pub struct RotationTrigger {
    store: Arc<KeyStore>,
    notifier: Arc<dyn ConnectNotifier>,
    active: AtomicBool,
}

impl RotationTrigger {
    pub const HOOK_NAME: &'static str = "key-rotation";

    pub fn new(store: Arc<KeyStore>, notifier: Arc<dyn ConnectNotifier>) -> Self {
        Self {
            store,
            notifier,
            active: AtomicBool::new(true),
        }
    }

    /// Registers the pre-send hook. When the host has no such extension point
    /// the feature switches itself off for the session instead of failing.
    /// Installing on a host that already carries the hook changes nothing.
    pub fn install(self: &Arc<Self>, host: &dyn SendHost) -> bool {
        let trigger = Arc::clone(self);
        let hook: PreSendHook = Arc::new(move |ctx: &mut SendContext<'_>| {
            let key = trigger.on_send();
            ctx.set_active_key(key);
            Ok(())
        });
        match host.register_pre_send(Self::HOOK_NAME, hook) {
            Ok(()) => {
                info!(hook = Self::HOOK_NAME, "key rotation hooked into message sending");
                true
            }
            Err(RotatorError::HookAlreadyRegistered(_)) => {
                debug!(hook = Self::HOOK_NAME, "key rotation already hooked into message sending");
                self.is_active()
            }
            Err(err) => {
                error!(error = %err, "could not hook message sending, key rotation disabled for this session");
                self.active.store(false, Ordering::SeqCst);
                false
            }
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// One rotation step. The key handed to the notifier is exactly the one
    /// `advance` returned for this call.
    pub fn on_send(&self) -> Option<String> {
        if !self.is_active() || !self.store.is_enabled() {
            return None;
        }
        let key = self.store.advance();
        match &key {
            Some(key) => info!(key = %mask_key(key), "message sent, rotated api key"),
            None => debug!("rotation enabled but no keys configured"),
        }
        self.notifier.notify(key.as_deref());
        key
    }
}

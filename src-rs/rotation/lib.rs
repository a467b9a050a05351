pub mod hooks;
pub mod notifier;
pub mod trigger;

pub use hooks::{HookRegistry, OutgoingMessage, PreSendHook, SendContext, SendHost};
pub use notifier::{ConnectNotifier, HttpConnectNotifier, NotifyStats};
pub use trigger::RotationTrigger;

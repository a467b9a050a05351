pub use crate::config::RotatorConfig;
pub use crate::keys::{KeySnapshot, KeyStore};
pub use crate::result::SendOutcome;
pub use crate::rotation::NotifyStats;
pub use crate::session::Session;

pub mod handlers;
pub mod server;

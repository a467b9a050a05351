pub mod config;
pub mod error;
pub mod helpers;
pub mod result;
pub mod session;

#[path = "keys/lib.rs"]
pub mod keys;
#[path = "rotation/lib.rs"]
pub mod rotation;
#[path = "api/lib.rs"]
pub mod api;

pub use config::{RemovalPolicy, RotatorConfig};
pub use error::{Result, RotatorError};
pub use result::SendOutcome;
pub use session::Session;

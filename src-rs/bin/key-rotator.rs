use std::sync::Arc;

use key_rotator_rs::api::server::RotatorServer;
use key_rotator_rs::{RotatorConfig, Session};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("key_rotator_rs=info")),
        )
        .init();

    let config = match RotatorConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            tracing::error!(error = %err, "invalid configuration");
            std::process::exit(2);
        }
    };
    let port = config.port;

    let session = match Session::start(config) {
        Ok(session) => Arc::new(session),
        Err(err) => {
            tracing::error!(error = %err, "failed to start key rotator");
            std::process::exit(1);
        }
    };

    let server = RotatorServer::new(port, session);
    if let Err(err) = server.start().await {
        tracing::error!(error = %err, "server error");
    }
}

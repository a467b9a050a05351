use std::net::{SocketAddr, TcpListener};
use std::sync::Arc;

use axum::routing::{delete, get, post, put};
use axum::Router;
use tracing::info;

use crate::api::handlers::{
    handle_add_key, handle_health, handle_list_keys, handle_remove_key, handle_send, handle_set_enabled,
    handle_stats,
};
use crate::error::Result;
use crate::session::Session;

pub struct RotatorServer {
    pub port: u16,
    pub session: Arc<Session>,
}

impl RotatorServer {
    pub fn new(port: u16, session: Arc<Session>) -> Self {
        Self { port, session }
    }

    pub fn router(&self) -> Router {
        Router::new()
            .route("/health", get(handle_health))
            .route("/keys", get(handle_list_keys).post(handle_add_key))
            .route("/keys/:index", delete(handle_remove_key))
            .route("/enabled", put(handle_set_enabled))
            .route("/messages", post(handle_send))
            .route("/stats", get(handle_stats))
            .with_state(self.session.clone())
    }

    pub async fn start(&self) -> Result<()> {
        let addr = SocketAddr::from(([0, 0, 0, 0], self.port));
        let listener = TcpListener::bind(addr)?;
        self.serve(listener).await
    }

    pub async fn serve(&self, listener: TcpListener) -> Result<()> {
        let addr = listener.local_addr()?;
        info!(%addr, "key rotator listening");
        axum::Server::from_tcp(listener)
            .map_err(std::io::Error::other)?
            .serve(self.router().into_make_service())
            .await
            .map_err(std::io::Error::other)?;
        Ok(())
    }
}

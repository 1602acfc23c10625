use crate::ice::CredentialBroker;
use crate::session::{SessionRegistry, SharedRegistry};
use crate::signaling::lifecycle::serve_connection;
use crate::signaling::relay::RelayEngine;
use axum::extract::ws::WebSocketUpgrade;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::routing::any;
use axum::Router;
use log::{error, info};
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;

pub const HEALTH_BODY: &str = "ok";

pub const BANNER: &str = "Remote session signaling relay\n";

/// HTTP front end: WebSocket upgrades on any path become signaling
/// connections, everything else gets a fixed plain-text body.
pub struct SignalingServer {
    engine: RelayEngine,
}

impl SignalingServer {
    pub fn new(registry: SessionRegistry, broker: CredentialBroker) -> Self {
        Self {
            engine: RelayEngine::new(registry.into_shared(), Arc::new(broker)),
        }
    }

    pub fn registry(&self) -> SharedRegistry {
        Arc::clone(self.engine.registry())
    }

    pub fn router(&self) -> Router {
        Router::new()
            .route("/health", any(health))
            .fallback(banner)
            .with_state(self.engine.clone())
    }

    /// Serves on `listener` until `shutdown` resolves. The registry is
    /// dropped with the server.
    pub async fn run<F>(self, listener: TcpListener, shutdown: F) -> std::io::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        info!("Signaling relay listening on {}", listener.local_addr()?);
        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown)
            .await
    }
}

async fn health(State(engine): State<RelayEngine>, ws: Option<WebSocketUpgrade>) -> Response {
    upgrade_or(engine, ws, HEALTH_BODY)
}

async fn banner(State(engine): State<RelayEngine>, ws: Option<WebSocketUpgrade>) -> Response {
    upgrade_or(engine, ws, BANNER)
}

fn upgrade_or(engine: RelayEngine, ws: Option<WebSocketUpgrade>, body: &'static str) -> Response {
    match ws {
        Some(ws) => ws.on_upgrade(move |socket| serve_connection(socket, engine)),
        None => body.into_response(),
    }
}

/// Resolves on Ctrl-C.
pub async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown requested");
}

pub mod config;
pub mod error;
pub mod ice;
pub mod logger;
pub mod session;
pub mod signaling;
pub mod utils;

use anyhow::Context;
use log::{info, warn};
use tokio::net::TcpListener;

pub use config::Config;
pub use error::{IceError, ProtocolError, SessionError};
pub use ice::{CredentialBroker, IceConfiguration, IceServer};
pub use session::{SessionRegistry, SharedRegistry};
pub use signaling::SignalingServer;

/// Binds the listener and serves until Ctrl-C.
pub async fn run(config: Config) -> anyhow::Result<()> {
    let broker = config
        .credential_broker()
        .context("invalid credential provider configuration")?;
    match broker.provider_name() {
        Some(name) => info!("ICE credentials come from the {} provider", name),
        None => warn!("No TURN provider configured, get-ice answers STUN only"),
    }

    let addr = config.bind_addr();
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;

    SignalingServer::new(SessionRegistry::new(), broker)
        .run(listener, signaling::shutdown_signal())
        .await?;
    Ok(())
}

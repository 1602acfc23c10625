//! Signaling relay binary.
//!
//! Usage:
//! ```bash
//! signal-relay --port 8080
//! TWILIO_ACCOUNT_SID=AC... TWILIO_AUTH_TOKEN=... signal-relay
//! ```

use anyhow::Result;
use clap::Parser;
use signal_relay_lib::{logger, Config};

#[tokio::main]
async fn main() -> Result<()> {
    logger::init();

    let config = Config::parse();

    signal_relay_lib::run(config).await
}

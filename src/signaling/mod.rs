//! WebSocket signaling: message classification, the relay state machine
//! and per-connection lifecycle.
//!
//! # Protocol
//!
//! Every frame is a JSON object with a `type`.
//!
//! ## Client → server
//!
//! - `get-ice` - ask for an ICE configuration
//! - `create-session` - become the host of a new session
//! - `join-session` + `code` - become the controller of an existing session
//! - anything else with a `code` - forwarded untouched to the other party
//!
//! ## Server → client
//!
//! - `ice-config`, `session-created`, `join-success`, `join-failed`,
//!   `controller-joined`, `controller-left`, `host-left`

pub mod lifecycle;
pub mod messages;
pub mod relay;
pub mod server;

pub use lifecycle::{detach, serve_connection};
pub use messages::{classify, ClientMessage, Outbound, Payload, ServerMessage};
pub use relay::RelayEngine;
pub use server::{shutdown_signal, SignalingServer, BANNER, HEALTH_BODY};

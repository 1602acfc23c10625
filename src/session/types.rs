use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::mpsc;

static NEXT_ENDPOINT_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of one signaling connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EndpointId(u64);

impl EndpointId {
    pub fn next() -> Self {
        Self(NEXT_ENDPOINT_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl std::fmt::Display for EndpointId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Handle to a connection's outbound queue.
///
/// Cloned into the registry when the connection becomes a host or a
/// controller. The queue is drained by the connection's writer task, so
/// an endpoint counts as open exactly as long as that task is alive.
#[derive(Debug, Clone)]
pub struct Endpoint {
    id: EndpointId,
    tx: mpsc::UnboundedSender<String>,
}

impl Endpoint {
    pub fn new(id: EndpointId, tx: mpsc::UnboundedSender<String>) -> Self {
        Self { id, tx }
    }

    /// Creates an endpoint together with the receiving half of its queue.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(EndpointId::next(), tx), rx)
    }

    pub fn id(&self) -> EndpointId {
        self.id
    }

    pub fn is_open(&self) -> bool {
        !self.tx.is_closed()
    }

    /// Queues raw text. Returns `false` if the endpoint is already closed.
    pub fn send_text(&self, text: String) -> bool {
        self.tx.send(text).is_ok()
    }

    /// Serializes and queues a message; closed endpoints are skipped.
    pub fn send<T: Serialize>(&self, msg: &T) -> bool {
        match serde_json::to_string(msg) {
            Ok(text) => self.send_text(text),
            Err(e) => {
                log::error!("Failed to serialize message for {}: {}", self.id, e);
                false
            }
        }
    }
}

/// What a connection currently is with respect to the registry.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Binding {
    #[default]
    Unbound,
    Host(String),
    Controller(String),
}

/// One host paired with at most one controller under a shared code.
#[derive(Debug, Clone)]
pub struct Session {
    pub code: String,
    pub host: Endpoint,
    pub controller: Option<Endpoint>,
}

impl Session {
    /// The party opposite to `from`, if `from` takes part in this session.
    pub fn peer_of(&self, from: EndpointId) -> Option<Option<&Endpoint>> {
        if self.host.id() == from {
            Some(self.controller.as_ref())
        } else if self.controller.as_ref().map(Endpoint::id) == Some(from) {
            Some(Some(&self.host))
        } else {
            None
        }
    }
}

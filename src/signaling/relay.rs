use crate::ice::CredentialBroker;
use crate::session::{Binding, Endpoint, SharedRegistry};
use crate::signaling::lifecycle::detach;
use crate::signaling::messages::{classify, ClientMessage, Outbound, ServerMessage};
use log::{debug, error, info};
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Per-message state machine. Cheap to clone; every connection task holds one.
#[derive(Clone)]
pub struct RelayEngine {
    registry: SharedRegistry,
    broker: Arc<CredentialBroker>,
}

impl RelayEngine {
    pub fn new(registry: SharedRegistry, broker: Arc<CredentialBroker>) -> Self {
        Self { registry, broker }
    }

    pub fn registry(&self) -> &SharedRegistry {
        &self.registry
    }

    /// Handles one inbound text frame from `from`. Malformed frames are dropped.
    pub fn handle(&self, from: &Endpoint, text: &str) {
        match classify(text) {
            Ok(msg) => self.dispatch(from, msg, text),
            Err(e) => debug!("Dropping frame from {}: {}", from.id(), e),
        }
    }

    fn dispatch(&self, from: &Endpoint, msg: ClientMessage, raw: &str) {
        match msg {
            ClientMessage::GetIce => {
                self.get_ice(from);
            }
            ClientMessage::CreateSession => self.create_session(from),
            ClientMessage::JoinSession { code } => self.join_session(from, code),
            ClientMessage::Relay { code, kind } => self.relay(from, &code, &kind, raw),
        }
    }

    /// Fetches credentials off the connection's read path; the reply is
    /// dropped if the requester is gone by then.
    fn get_ice(&self, from: &Endpoint) -> JoinHandle<()> {
        let broker = Arc::clone(&self.broker);
        let requester = from.clone();
        tokio::spawn(async move {
            let config = broker.get().await;
            if !requester.send(&ServerMessage::IceConfig(config)) {
                debug!(
                    "{} left before its ICE configuration was ready",
                    requester.id()
                );
            }
        })
    }

    fn create_session(&self, from: &Endpoint) {
        let mut outbound = Vec::with_capacity(2);
        {
            let mut registry = self.registry.lock();
            outbound.extend(detach(&mut registry, from.id()));
            match registry.create(from.clone()) {
                Ok(code) => {
                    let created = ServerMessage::SessionCreated { code };
                    outbound.push(Outbound::message(from.clone(), created));
                }
                Err(e) => error!("Could not create a session for {}: {}", from.id(), e),
            }
        }
        deliver_all(outbound);
    }

    fn join_session(&self, from: &Endpoint, code: String) {
        let mut outbound = Vec::with_capacity(3);
        {
            let mut registry = self.registry.lock();
            let joined = registry.joinable(&code, from.id()).and_then(|()| {
                if registry.find_by_endpoint(from.id()) != Binding::Controller(code.clone()) {
                    outbound.extend(detach(&mut registry, from.id()));
                }
                registry.bind_controller(&code, from.clone())
            });
            match joined {
                Ok(host) => {
                    let shared = code.clone();
                    let success = ServerMessage::JoinSuccess { code: shared };
                    outbound.push(Outbound::message(from.clone(), success));
                    let joined = ServerMessage::ControllerJoined { code };
                    outbound.push(Outbound::message(host, joined));
                }
                Err(e) => {
                    info!("Join of {} by {} refused: {}", code, from.id(), e);
                    let failed = ServerMessage::JoinFailed { code };
                    outbound.push(Outbound::message(from.clone(), failed));
                }
            }
        }
        deliver_all(outbound);
    }

    /// Fire and forget: unknown codes, strangers and absent peers are all silent drops.
    fn relay(&self, from: &Endpoint, code: &str, kind: &str, raw: &str) {
        let target = self.registry.lock().relay_target(code, from.id());
        match target {
            Ok(peer) => {
                if Outbound::raw(peer, raw.to_string()).deliver() {
                    debug!("Relayed {:?} from {} in session {}", kind, from.id(), code);
                }
            }
            Err(e) => debug!("Dropping {:?} from {}: {}", kind, from.id(), e),
        }
    }

    /// Lifecycle hook for a closed connection.
    pub fn disconnect(&self, endpoint: &Endpoint) {
        let notice = detach(&mut self.registry.lock(), endpoint.id());
        deliver_all(notice);
    }
}

fn deliver_all(outbound: impl IntoIterator<Item = Outbound>) {
    for frame in outbound {
        let to = frame.to.id();
        if !frame.deliver() {
            debug!("{} is closed, notice skipped", to);
        }
    }
}

use crate::error::SessionError;
use crate::session::code::{CodeSource, RandomCodes};
use crate::session::types::{Binding, Endpoint, EndpointId, Session};
use log::{debug, info};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

/// How many codes `create` draws before giving up on finding a free one.
pub const MAX_CODE_ATTEMPTS: usize = 32;

/// Registry shared by every connection task. Each operation is one critical section.
pub type SharedRegistry = Arc<Mutex<SessionRegistry>>;

/// Owns every active session, keyed by code, plus the reverse
/// endpoint -> binding index. Both maps change together in every method.
pub struct SessionRegistry {
    sessions: HashMap<String, Session>,
    bindings: HashMap<EndpointId, Binding>,
    codes: Box<dyn CodeSource>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::with_codes(Box::new(RandomCodes))
    }

    pub fn with_codes(codes: Box<dyn CodeSource>) -> Self {
        Self {
            sessions: HashMap::new(),
            bindings: HashMap::new(),
            codes,
        }
    }

    pub fn into_shared(self) -> SharedRegistry {
        Arc::new(Mutex::new(self))
    }

    /// Stores a new session under a fresh code and binds `host` to it.
    ///
    /// The caller detaches any previous binding of `host` first.
    pub fn create(&mut self, host: Endpoint) -> Result<String, SessionError> {
        let code = self.free_code()?;
        self.bindings.insert(host.id(), Binding::Host(code.clone()));
        info!("Session {} created by {}", code, host.id());
        self.sessions.insert(
            code.clone(),
            Session {
                code: code.clone(),
                host,
                controller: None,
            },
        );
        Ok(code)
    }

    fn free_code(&mut self) -> Result<String, SessionError> {
        for _ in 0..MAX_CODE_ATTEMPTS {
            let code = self.codes.next_code();
            if !self.sessions.contains_key(&code) {
                return Ok(code);
            }
            debug!("Session code {} already in use, drawing another", code);
        }
        Err(SessionError::CodeSpaceExhausted(MAX_CODE_ATTEMPTS))
    }

    pub fn lookup(&self, code: &str) -> Option<&Session> {
        self.sessions.get(code)
    }

    /// Checks whether `joiner` could become the controller of `code` right now.
    pub fn joinable(&self, code: &str, joiner: EndpointId) -> Result<(), SessionError> {
        let session = self
            .sessions
            .get(code)
            .ok_or_else(|| SessionError::NoSuchSession(code.to_string()))?;
        if !session.host.is_open() {
            return Err(SessionError::HostUnavailable(code.to_string()));
        }
        if session.host.id() == joiner {
            return Err(SessionError::AlreadyHost(code.to_string()));
        }
        Ok(())
    }

    /// Makes `controller` the controller of `code` and returns the host to notify.
    ///
    /// A previous controller is displaced and loses its binding.
    pub fn bind_controller(
        &mut self,
        code: &str,
        controller: Endpoint,
    ) -> Result<Endpoint, SessionError> {
        self.joinable(code, controller.id())?;
        let session = self
            .sessions
            .get_mut(code)
            .ok_or_else(|| SessionError::NoSuchSession(code.to_string()))?;

        if let Some(previous) = session.controller.replace(controller.clone()) {
            if previous.id() != controller.id() {
                info!(
                    "Controller {} of session {} displaced by {}",
                    previous.id(),
                    code,
                    controller.id()
                );
                self.bindings.remove(&previous.id());
            }
        }
        self.bindings
            .insert(controller.id(), Binding::Controller(code.to_string()));
        info!("{} joined session {} as controller", controller.id(), code);
        Ok(session.host.clone())
    }

    /// Deletes the session whatever its controller state.
    pub fn remove_by_host_disconnect(&mut self, code: &str) -> Option<Session> {
        let session = self.sessions.remove(code)?;
        self.bindings.remove(&session.host.id());
        if let Some(controller) = &session.controller {
            self.bindings.remove(&controller.id());
        }
        info!("Session {} removed", code);
        Some(session)
    }

    /// Empties the controller slot and returns whoever held it.
    pub fn release_controller(&mut self, code: &str) -> Option<Endpoint> {
        let controller = self.sessions.get_mut(code)?.controller.take()?;
        self.bindings.remove(&controller.id());
        info!("Controller {} left session {}", controller.id(), code);
        Some(controller)
    }

    pub fn find_by_endpoint(&self, endpoint: EndpointId) -> Binding {
        self.bindings.get(&endpoint).cloned().unwrap_or_default()
    }

    /// Resolves where a relay payload from `from` under `code` must go.
    pub fn relay_target(&self, code: &str, from: EndpointId) -> Result<Endpoint, SessionError> {
        let session = self
            .sessions
            .get(code)
            .ok_or_else(|| SessionError::NoSuchSession(code.to_string()))?;
        match session.peer_of(from) {
            None => Err(SessionError::NotAParticipant(code.to_string())),
            Some(Some(peer)) if peer.is_open() => Ok(peer.clone()),
            Some(_) => Err(SessionError::PeerUnavailable(code.to_string())),
        }
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

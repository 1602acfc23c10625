use thiserror::Error;

/// Failures of Session Registry operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("no session with code {0}")]
    NoSuchSession(String),

    #[error("host of session {0} is no longer connected")]
    HostUnavailable(String),

    #[error("endpoint already hosts session {0}")]
    AlreadyHost(String),

    #[error("endpoint is not a participant of session {0}")]
    NotAParticipant(String),

    #[error("peer of session {0} is not connected")]
    PeerUnavailable(String),

    #[error("no free session code after {0} attempts")]
    CodeSpaceExhausted(usize),
}

/// Malformed inbound frames. Always dropped, the connection stays open.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("message is not a JSON object")]
    NotAnObject,

    #[error("message of type {0:?} carries no session code")]
    MissingCode(String),
}

/// Credential provider failures. Never surfaced to clients.
#[derive(Debug, Error)]
pub enum IceError {
    #[error("provider request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("provider did not answer within {0:?}")]
    Timeout(std::time::Duration),

    #[error("provider returned no ICE servers")]
    Empty,

    #[error("invalid provider configuration: {0}")]
    Config(String),
}

use crate::error::ProtocolError;
use crate::ice::IceConfiguration;
use crate::session::Endpoint;
use crate::utils::normalize_code;
use serde::Serialize;
use serde_json::Value;

/// Inbound frame after classification. Relay payloads keep only what
/// routing needs; the original text is forwarded as is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientMessage {
    GetIce,
    CreateSession,
    JoinSession { code: String },
    Relay { code: String, kind: String },
}

/// Classifies one inbound text frame.
pub fn classify(text: &str) -> Result<ClientMessage, ProtocolError> {
    let value: Value = serde_json::from_str(text)?;
    let object = value.as_object().ok_or(ProtocolError::NotAnObject)?;

    let kind = object.get("type").and_then(Value::as_str).unwrap_or_default();
    let code = object
        .get("code")
        .and_then(Value::as_str)
        .map(normalize_code)
        .filter(|code| !code.is_empty());

    match kind {
        "get-ice" => Ok(ClientMessage::GetIce),
        "create-session" => Ok(ClientMessage::CreateSession),
        _ => {
            let code = code.ok_or_else(|| ProtocolError::MissingCode(kind.to_string()))?;
            if kind == "join-session" {
                Ok(ClientMessage::JoinSession { code })
            } else {
                Ok(ClientMessage::Relay {
                    code,
                    kind: kind.to_string(),
                })
            }
        }
    }
}

/// Messages the relay itself originates.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ServerMessage {
    IceConfig(IceConfiguration),
    SessionCreated { code: String },
    JoinFailed { code: String },
    JoinSuccess { code: String },
    ControllerJoined { code: String },
    ControllerLeft { code: String },
    HostLeft { code: String },
}

#[derive(Debug, Clone)]
pub enum Payload {
    Message(ServerMessage),
    /// Relay traffic, forwarded byte for byte.
    Raw(String),
}

/// A frame waiting to be queued on an endpoint once the registry lock is released.
#[derive(Debug, Clone)]
pub struct Outbound {
    pub to: Endpoint,
    pub payload: Payload,
}

impl Outbound {
    pub fn message(to: Endpoint, msg: ServerMessage) -> Self {
        Self {
            to,
            payload: Payload::Message(msg),
        }
    }

    pub fn raw(to: Endpoint, text: String) -> Self {
        Self {
            to,
            payload: Payload::Raw(text),
        }
    }

    /// Queues the frame; a closed endpoint makes this a no-op.
    pub fn deliver(self) -> bool {
        match self.payload {
            Payload::Message(msg) => self.to.send(&msg),
            Payload::Raw(text) => self.to.send_text(text),
        }
    }
}

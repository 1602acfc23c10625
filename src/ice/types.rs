use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// Public STUN server handed out when no TURN credentials can be had.
pub const FALLBACK_STUN_URL: &str = "stun:stun.l.google.com:19302";

/// Marker attached to the fallback configuration.
pub const DEGRADED_WARNING: &str = "TURN credentials unavailable; using STUN only";

static DEGRADED: Lazy<IceConfiguration> = Lazy::new(|| IceConfiguration {
    ice_servers: vec![IceServer::stun(FALLBACK_STUN_URL)],
    warning: Some(DEGRADED_WARNING.to_string()),
});

/// One STUN/TURN server entry as browsers expect it in `RTCConfiguration`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct IceServer {
    pub urls: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credential: Option<String>,
}

impl IceServer {
    pub fn stun(url: impl Into<String>) -> Self {
        Self {
            urls: url.into(),
            username: None,
            credential: None,
        }
    }
}

/// Ordered server list plus an optional degradation marker.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct IceConfiguration {
    pub ice_servers: Vec<IceServer>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

impl IceConfiguration {
    pub fn new(ice_servers: Vec<IceServer>) -> Self {
        Self {
            ice_servers,
            warning: None,
        }
    }

    /// The fixed STUN-only configuration.
    pub fn degraded() -> Self {
        DEGRADED.clone()
    }

    pub fn is_degraded(&self) -> bool {
        self.warning.is_some()
    }
}

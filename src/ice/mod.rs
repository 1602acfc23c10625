pub mod broker;
pub mod turn_rest;
pub mod twilio;
pub mod types;

pub use broker::{CredentialBroker, CredentialProvider, DEFAULT_PROVIDER_TIMEOUT};
pub use turn_rest::SharedSecretProvider;
pub use twilio::TwilioProvider;
pub use types::{IceConfiguration, IceServer, DEGRADED_WARNING, FALLBACK_STUN_URL};

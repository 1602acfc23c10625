use crate::error::IceError;
use crate::ice::{CredentialBroker, CredentialProvider, SharedSecretProvider, TwilioProvider};
use clap::Parser;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

/// Process configuration; every flag also reads an environment variable.
#[derive(Parser, Clone)]
#[command(name = "signal-relay")]
#[command(about = "Rendezvous and signaling relay for remote-control sessions")]
#[command(version)]
pub struct Config {
    /// Address to listen on
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: IpAddr,

    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value_t = 8080)]
    pub port: u16,

    /// Twilio account SID for TURN credentials
    #[arg(long, env = "TWILIO_ACCOUNT_SID")]
    pub twilio_account_sid: Option<String>,

    /// Twilio auth token
    #[arg(long, env = "TWILIO_AUTH_TOKEN", hide_env_values = true)]
    pub twilio_auth_token: Option<String>,

    /// Shared secret of a self-hosted TURN server (used when Twilio is not configured)
    #[arg(long, env = "TURN_SECRET", hide_env_values = true)]
    pub turn_secret: Option<String>,

    /// TURN server URLs for the shared secret, comma separated
    #[arg(long = "turn-url", env = "TURN_URLS", value_delimiter = ',')]
    pub turn_urls: Vec<String>,

    /// Lifetime of issued TURN credentials in seconds
    #[arg(long, env = "ICE_TTL", default_value_t = 86400)]
    pub ice_ttl: u64,

    /// Seconds to wait for the credential provider before falling back to STUN
    #[arg(long, env = "PROVIDER_TIMEOUT", default_value_t = 10)]
    pub provider_timeout: u64,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl Config {
    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Picks the credential provider: Twilio, then shared-secret TURN, then none.
    pub fn credential_broker(&self) -> Result<CredentialBroker, IceError> {
        let ttl = Duration::from_secs(self.ice_ttl);
        let timeout = Duration::from_secs(self.provider_timeout);

        let twilio = non_empty(&self.twilio_account_sid).zip(non_empty(&self.twilio_auth_token));
        let provider: Option<Arc<dyn CredentialProvider>> = if let Some((sid, token)) = twilio {
            Some(Arc::new(TwilioProvider::new(sid, token, ttl)))
        } else if let Some(secret) = non_empty(&self.turn_secret) {
            Some(Arc::new(SharedSecretProvider::new(
                self.turn_urls.clone(),
                secret,
                ttl,
            )?))
        } else {
            None
        };

        Ok(CredentialBroker::new(provider, timeout))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Config {
        let mut argv = vec!["signal-relay", "--host", "127.0.0.1", "--port", "9000"];
        argv.extend_from_slice(args);
        Config::try_parse_from(argv).unwrap()
    }

    #[test]
    fn bind_address_comes_from_host_and_port() {
        assert_eq!(parse(&[]).bind_addr(), "127.0.0.1:9000".parse().unwrap());
    }

    #[test]
    fn twilio_credentials_enable_the_broker() {
        let config = parse(&[
            "--twilio-account-sid",
            "AC123",
            "--twilio-auth-token",
            "token",
        ]);
        let broker = config.credential_broker().unwrap();
        assert_eq!(broker.provider_name(), Some("twilio"));
    }

    #[test]
    fn shared_secret_needs_urls() {
        let config = parse(&["--turn-secret", "s3cret", "--turn-url", "a:3478,b:3478"]);
        assert_eq!(config.turn_urls, vec!["a:3478", "b:3478"]);
        let broker = config.credential_broker().unwrap();
        assert_eq!(broker.provider_name(), Some("turn-rest"));

        let config = Config {
            turn_urls: Vec::new(),
            ..config
        };
        let refused = config.credential_broker();
        assert!(matches!(refused, Err(IceError::Config(_))));
    }

    #[test]
    fn twilio_wins_over_shared_secret() {
        let config = parse(&[
            "--twilio-account-sid",
            "AC123",
            "--twilio-auth-token",
            "token",
            "--turn-secret",
            "s3cret",
            "--turn-url",
            "a:3478",
        ]);
        let broker = config.credential_broker().unwrap();
        assert_eq!(broker.provider_name(), Some("twilio"));
    }

    #[test]
    fn blank_twilio_falls_through_to_shared_secret() {
        let config = parse(&[
            "--twilio-account-sid",
            "AC123",
            "--twilio-auth-token",
            " ",
            "--turn-secret",
            "s3cret",
            "--turn-url",
            "a:3478",
        ]);
        let broker = config.credential_broker().unwrap();
        assert_eq!(broker.provider_name(), Some("turn-rest"));
    }

    #[test]
    fn blank_credentials_count_as_absent() {
        let config = Config {
            twilio_account_sid: Some(" ".into()),
            twilio_auth_token: Some("token".into()),
            turn_secret: Some(String::new()),
            ..parse(&[])
        };
        let broker = config.credential_broker().unwrap();
        assert!(!broker.is_configured());
        assert_eq!(broker.provider_name(), None);
    }
}

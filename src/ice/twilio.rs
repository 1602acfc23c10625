use crate::error::IceError;
use crate::ice::broker::CredentialProvider;
use crate::ice::types::IceServer;
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use zeroize::Zeroizing;

pub const TWILIO_API_BASE: &str = "https://api.twilio.com";

/// Network Traversal tokens from Twilio's REST API.
pub struct TwilioProvider {
    account_sid: String,
    auth_token: Zeroizing<String>,
    ttl: Duration,
    base_url: String,
    client: reqwest::Client,
}

#[derive(Deserialize, Debug)]
struct TokenResponse {
    #[serde(default)]
    ice_servers: Vec<TwilioIceServer>,
}

/// Twilio still sends the legacy `url` next to `urls`.
#[derive(Deserialize, Debug)]
struct TwilioIceServer {
    urls: Option<String>,
    url: Option<String>,
    username: Option<String>,
    credential: Option<String>,
}

impl TwilioIceServer {
    fn into_ice_server(self) -> Option<IceServer> {
        let urls = self.urls.or(self.url)?;
        Some(IceServer {
            urls,
            username: self.username,
            credential: self.credential,
        })
    }
}

impl TwilioProvider {
    pub fn new(
        account_sid: impl Into<String>,
        auth_token: impl Into<String>,
        ttl: Duration,
    ) -> Self {
        Self {
            account_sid: account_sid.into(),
            auth_token: Zeroizing::new(auth_token.into()),
            ttl,
            base_url: TWILIO_API_BASE.to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Points the provider at another API root.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn tokens_url(&self) -> String {
        format!(
            "{}/2010-04-01/Accounts/{}/Tokens.json",
            self.base_url.trim_end_matches('/'),
            self.account_sid
        )
    }
}

#[async_trait]
impl CredentialProvider for TwilioProvider {
    fn name(&self) -> &'static str {
        "twilio"
    }

    async fn fetch(&self) -> Result<Vec<IceServer>, IceError> {
        let response: TokenResponse = self
            .client
            .post(self.tokens_url())
            .basic_auth(&self.account_sid, Some(self.auth_token.as_str()))
            .form(&[("Ttl", self.ttl.as_secs().to_string())])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(response
            .ice_servers
            .into_iter()
            .filter_map(TwilioIceServer::into_ice_server)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_url_includes_account() {
        let provider = TwilioProvider::new("AC123", "token", Duration::from_secs(60))
            .with_base_url("http://127.0.0.1:9/");
        assert_eq!(
            provider.tokens_url(),
            "http://127.0.0.1:9/2010-04-01/Accounts/AC123/Tokens.json"
        );
    }

    #[test]
    fn token_response_maps_urls_and_legacy_url() {
        let body = r#"{
            "account_sid": "AC123",
            "ttl": "86400",
            "ice_servers": [
                {
                    "url": "stun:global.stun.twilio.com:3478",
                    "urls": "stun:global.stun.twilio.com:3478"
                },
                {
                    "url": "turn:global.turn.twilio.com:3478?transport=udp",
                    "username": "u1",
                    "credential": "c1"
                },
                {"username": "orphan"}
            ]
        }"#;
        let response: TokenResponse = serde_json::from_str(body).unwrap();
        let servers: Vec<_> = response
            .ice_servers
            .into_iter()
            .filter_map(TwilioIceServer::into_ice_server)
            .collect();

        assert_eq!(servers.len(), 2);
        assert_eq!(servers[0], IceServer::stun("stun:global.stun.twilio.com:3478"));
        assert_eq!(servers[1].urls, "turn:global.turn.twilio.com:3478?transport=udp");
        assert_eq!(servers[1].username.as_deref(), Some("u1"));
        assert_eq!(servers[1].credential.as_deref(), Some("c1"));
    }

    #[tokio::test]
    async fn unreachable_api_is_an_error() {
        // Port 9 (discard) is closed on test machines.
        let provider = TwilioProvider::new("AC123", "token", Duration::from_secs(60))
            .with_base_url("http://127.0.0.1:9");
        assert!(matches!(provider.fetch().await, Err(IceError::Http(_))));
    }
}

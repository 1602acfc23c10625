use crate::error::IceError;
use crate::ice::broker::CredentialProvider;
use crate::ice::types::IceServer;
use crate::utils::{add_ice_url_scheme, random_id};
use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use ring::hmac;
use std::time::Duration;
use zeroize::Zeroizing;

/// Time-limited credentials for a self-hosted TURN server sharing a
/// static secret with this relay (the coturn `use-auth-secret` scheme).
///
/// username   = "<unix expiry>:<random id>"
/// credential = base64(HMAC-SHA1(secret, username))
pub struct SharedSecretProvider {
    urls: Vec<String>,
    secret: Zeroizing<String>,
    ttl: Duration,
}

impl SharedSecretProvider {
    pub fn new(
        urls: Vec<String>,
        secret: impl Into<String>,
        ttl: Duration,
    ) -> Result<Self, IceError> {
        let urls: Vec<String> = urls
            .iter()
            .filter(|url| !url.trim().is_empty())
            .map(|url| add_ice_url_scheme(url))
            .collect();
        if urls.is_empty() {
            return Err(IceError::Config("no TURN urls given".into()));
        }
        let secret = Zeroizing::new(secret.into());
        if secret.is_empty() {
            return Err(IceError::Config("TURN secret is empty".into()));
        }
        Ok(Self { urls, secret, ttl })
    }

    /// Credential pair valid until `now_unix + ttl`, capped at `i64::MAX`.
    pub fn credentials_at(&self, now_unix: i64) -> (String, String) {
        let ttl = i64::try_from(self.ttl.as_secs()).unwrap_or(i64::MAX);
        let expiry = now_unix.saturating_add(ttl);
        let username = format!("{}:{}", expiry, random_id());
        let key = hmac::Key::new(hmac::HMAC_SHA1_FOR_LEGACY_USE_ONLY, self.secret.as_bytes());
        let tag = hmac::sign(&key, username.as_bytes());
        (username, general_purpose::STANDARD.encode(tag.as_ref()))
    }
}

#[async_trait]
impl CredentialProvider for SharedSecretProvider {
    fn name(&self) -> &'static str {
        "turn-rest"
    }

    async fn fetch(&self) -> Result<Vec<IceServer>, IceError> {
        let (username, credential) = self.credentials_at(chrono::Utc::now().timestamp());
        Ok(self
            .urls
            .iter()
            .map(|url| IceServer {
                urls: url.clone(),
                username: Some(username.clone()),
                credential: Some(credential.clone()),
            })
            .collect())
    }
}

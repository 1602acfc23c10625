use crate::error::IceError;
use crate::ice::types::{IceConfiguration, IceServer};
use async_trait::async_trait;
use log::{debug, warn};
use std::sync::Arc;
use std::time::Duration;

/// Default bound on a single provider call.
pub const DEFAULT_PROVIDER_TIMEOUT: Duration = Duration::from_secs(10);

/// An external source of short-lived NAT-traversal credentials.
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    fn name(&self) -> &'static str;

    async fn fetch(&self) -> Result<Vec<IceServer>, IceError>;
}

/// Hands out ICE configurations. `get` never fails: every provider
/// problem turns into the degraded STUN-only answer.
#[derive(Clone)]
pub struct CredentialBroker {
    provider: Option<Arc<dyn CredentialProvider>>,
    timeout: Duration,
}

impl CredentialBroker {
    pub fn new(provider: Option<Arc<dyn CredentialProvider>>, timeout: Duration) -> Self {
        Self { provider, timeout }
    }

    /// A broker without a provider; every request gets the fallback.
    pub fn stun_only() -> Self {
        Self::new(None, DEFAULT_PROVIDER_TIMEOUT)
    }

    pub fn with_provider(provider: Arc<dyn CredentialProvider>) -> Self {
        Self::new(Some(provider), DEFAULT_PROVIDER_TIMEOUT)
    }

    pub fn is_configured(&self) -> bool {
        self.provider.is_some()
    }

    pub fn provider_name(&self) -> Option<&'static str> {
        self.provider.as_ref().map(|provider| provider.name())
    }

    pub async fn get(&self) -> IceConfiguration {
        let Some(provider) = &self.provider else {
            debug!("No credential provider configured, answering STUN only");
            return IceConfiguration::degraded();
        };

        match self.fetch(provider.as_ref()).await {
            Ok(servers) => {
                debug!("{} issued {} ICE servers", provider.name(), servers.len());
                IceConfiguration::new(servers)
            }
            Err(e) => {
                warn!(
                    "{} credential fetch failed, falling back to STUN only: {}",
                    provider.name(),
                    e
                );
                IceConfiguration::degraded()
            }
        }
    }

    async fn fetch(&self, provider: &dyn CredentialProvider) -> Result<Vec<IceServer>, IceError> {
        let servers = tokio::time::timeout(self.timeout, provider.fetch())
            .await
            .map_err(|_| IceError::Timeout(self.timeout))??;
        if servers.is_empty() {
            return Err(IceError::Empty);
        }
        Ok(servers)
    }
}

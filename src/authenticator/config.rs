//! Provider list and token expiry, swappable while requests are in flight.

use super::Error;
use crate::rpc::RpcChannel;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;
use tracing::{debug, instrument};

/// Subject used to fetch the configuration document.
pub const CONFIG_GET_SUBJECT: &str = "config.get.authenticator";
/// Subject announcing that the configuration document changed.
pub const CONFIG_SET_SUBJECT: &str = "config.set.authenticator";

const DEFAULT_EXPIRY_HOURS: u64 = 24;

/// Describes the remote side of a provider; informational only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provider {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub config: ProviderConfig,
}

impl Provider {
    #[must_use]
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            config: ProviderConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub providers: Vec<Provider>,
    /// Token lifetime in hours; zero means the default of 24.
    #[serde(default)]
    pub expiry: u64,
}

impl Config {
    #[must_use]
    pub fn new(providers: Vec<Provider>) -> Self {
        Self {
            providers,
            expiry: 0,
        }
    }

    #[must_use]
    pub fn with_expiry_hours(mut self, hours: u64) -> Self {
        self.expiry = hours;
        self
    }

    /// Build a config from a comma separated list of provider types.
    #[must_use]
    pub fn from_provider_list(list: &str) -> Self {
        Self::new(
            list.split(',')
                .map(str::trim)
                .filter(|kind| !kind.is_empty())
                .map(Provider::new)
                .collect(),
        )
    }

    #[must_use]
    pub fn token_expiry(&self) -> Duration {
        let hours = if self.expiry == 0 {
            DEFAULT_EXPIRY_HOURS
        } else {
            self.expiry
        };
        Duration::from_secs(hours.saturating_mul(3600))
    }

    /// Parse the JSON document served by the config service.
    ///
    /// # Errors
    /// Returns [`Error::Malformed`] if the document is not valid.
    pub fn from_json(document: &[u8]) -> Result<Self, Error> {
        serde_json::from_slice(document).map_err(|e| Error::malformed(CONFIG_GET_SUBJECT, e))
    }

    /// Request the current document from the config service.
    ///
    /// # Errors
    /// Returns an error if the request fails or the reply cannot be parsed.
    #[instrument(skip(channel))]
    pub async fn fetch(channel: &dyn RpcChannel, timeout: Duration) -> Result<Self, Error> {
        let reply = channel
            .request(CONFIG_GET_SUBJECT, Vec::new(), timeout)
            .await?;
        let config = Self::from_json(&reply)?;

        debug!("fetched configuration with {} providers", config.providers.len());

        Ok(config)
    }
}

/// Read-mostly holder for the active [`Config`].
///
/// Readers take an `Arc` snapshot and keep using it for the whole request;
/// [`SharedConfig::replace`] installs a new value in one step.
#[derive(Debug, Clone, Default)]
pub struct SharedConfig {
    inner: Arc<RwLock<Arc<Config>>>,
}

impl SharedConfig {
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Arc::new(config))),
        }
    }

    #[must_use]
    pub fn snapshot(&self) -> Arc<Config> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn replace(&self, config: Config) {
        *self.inner.write().unwrap_or_else(PoisonError::into_inner) = Arc::new(config);
    }
}

use super::{
    provider::{IdentityProvider, Verdict},
    Credentials, Error,
};
use crate::rpc::RpcChannel;
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument};

#[derive(Debug, Deserialize)]
struct ProviderReply {
    ok: bool,
    #[serde(default)]
    admin: Option<bool>,
    #[serde(default)]
    message: Option<String>,
}

/// Delegates credential checks to a remote provider listening on `<name>.auth`.
#[derive(Clone)]
pub struct FederatedProvider {
    name: String,
    subject: String,
    channel: Arc<dyn RpcChannel>,
    timeout: Duration,
}

impl FederatedProvider {
    #[must_use]
    pub fn new(name: impl Into<String>, channel: Arc<dyn RpcChannel>, timeout: Duration) -> Self {
        let name = name.into();
        Self {
            subject: format!("{name}.auth"),
            name,
            channel,
            timeout,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn subject(&self) -> &str {
        &self.subject
    }
}

#[async_trait]
impl IdentityProvider for FederatedProvider {
    #[instrument(skip(self, credentials), fields(provider = %self.name, username = %credentials.username))]
    async fn verify(&self, credentials: &Credentials) -> Result<Verdict, Error> {
        let payload = serde_json::to_vec(&credentials.to_provider_request())
            .map_err(|e| Error::malformed(&self.subject, e))?;

        let reply = self
            .channel
            .request(&self.subject, payload, self.timeout)
            .await?;

        let reply: ProviderReply =
            serde_json::from_slice(&reply).map_err(|e| Error::malformed(&self.subject, e))?;

        if !reply.ok {
            return Err(Error::Rejected {
                provider: self.name.clone(),
                message: reply.message.unwrap_or_default(),
            });
        }

        debug!("{} accepted {}", self.name, credentials.username);

        Ok(Verdict {
            admin: reply.admin.unwrap_or(false),
        })
    }
}

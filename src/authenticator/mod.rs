//! Authentication orchestration: provider chain, step-up verification,
//! federated user provisioning and token issuing.

pub mod config;
pub mod credentials;
pub mod directory;
pub mod error;
pub mod federation;
pub mod local;
pub mod mfa;
pub mod password;
pub mod provider;
pub mod token;

pub use config::{Config, Provider, SharedConfig};
pub use credentials::{AuthResponse, Credentials};
pub use directory::{UserDirectory, UserRecord};
pub use error::{Error, AUTHENTICATION_FAILED};
pub use federation::FederatedProvider;
pub use local::LocalProvider;
pub use mfa::MfaVerifier;
pub use provider::{IdentityProvider, ProviderKind, Verdict};
pub use token::{Claims, TokenIssuer};

use crate::rpc::{RpcChannel, DEFAULT_TIMEOUT};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Federated provider registered when none is named explicitly.
pub const DEFAULT_FEDERATION: &str = "federation";

/// Entry point for authentication requests.
///
/// Holds no per-request state; share it behind an `Arc` and call
/// [`Authenticator::authenticate`] from as many tasks as needed.
pub struct Authenticator {
    local: Arc<dyn IdentityProvider>,
    federated: HashMap<String, Arc<dyn IdentityProvider>>,
    directory: UserDirectory,
    mfa: MfaVerifier,
    issuer: TokenIssuer,
    config: SharedConfig,
    timeout: Duration,
}

impl Authenticator {
    #[must_use]
    pub fn builder(channel: Arc<dyn RpcChannel>, issuer: TokenIssuer) -> AuthenticatorBuilder {
        AuthenticatorBuilder::new(channel, issuer)
    }

    /// Handle used to swap the configuration while the service runs.
    #[must_use]
    pub fn config(&self) -> &SharedConfig {
        &self.config
    }

    /// Per-call timeout applied to every outbound request.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Authenticate `credentials` and return a signed token.
    ///
    /// # Errors
    /// Always [`Error::Unauthorized`]; the underlying cause is only logged.
    #[instrument(skip(self, credentials), fields(username = %credentials.username))]
    pub async fn authenticate(&self, credentials: &Credentials) -> Result<String, Error> {
        let config = self.config.snapshot();

        match self.run(&config, credentials).await {
            Ok(token) => Ok(token),
            Err(e) => {
                warn!("authentication failed: {}", e);
                Err(Error::Unauthorized)
            }
        }
    }

    async fn run(&self, config: &Config, credentials: &Credentials) -> Result<String, Error> {
        if credentials.username.is_empty() {
            return Err(Error::MissingUsername);
        }

        let (kind, verdict) = self.first_success(config, credentials).await?;

        if let Some(code) = credentials.verification_code() {
            self.mfa.verify(&credentials.username, code).await?;
        }

        if !kind.is_local() {
            self.provision(&credentials.username, &kind, verdict.admin)
                .await?;
        }

        let token = self
            .issuer
            .issue(&credentials.username, verdict.admin, config.token_expiry())?;

        info!("{} authenticated via {}", credentials.username, kind);

        Ok(token)
    }

    /// Walk the provider chain in order and stop at the first provider that
    /// accepts the credentials.
    async fn first_success(
        &self,
        config: &Config,
        credentials: &Credentials,
    ) -> Result<(ProviderKind, Verdict), Error> {
        let mut last_error = Error::Configuration("no providers configured".to_string());

        for entry in &config.providers {
            let kind = ProviderKind::parse(&entry.kind);

            let Some(provider) = self.provider(&kind) else {
                warn!("unknown provider type: {}", kind);
                last_error = Error::UnknownProvider(kind.to_string());
                continue;
            };

            match provider.verify(credentials).await {
                Ok(verdict) => return Ok((kind, verdict)),
                Err(e) => {
                    debug!("provider {} did not authenticate: {}", kind, e);
                    last_error = e;
                }
            }
        }

        Err(last_error)
    }

    fn provider(&self, kind: &ProviderKind) -> Option<&Arc<dyn IdentityProvider>> {
        match kind {
            ProviderKind::Local => Some(&self.local),
            ProviderKind::Federated(name) => self.federated.get(name),
        }
    }

    /// Create the local record for a federated user on first login.
    ///
    /// Existing records are left untouched, even if the admin flag reported by
    /// the provider has since changed.
    async fn provision(&self, username: &str, kind: &ProviderKind, admin: bool) -> Result<(), Error> {
        if self.directory.get(username).await?.is_some() {
            return Ok(());
        }

        self.directory.create(username, kind.as_str(), admin).await
    }
}

impl std::fmt::Debug for Authenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut federated: Vec<&String> = self.federated.keys().collect();
        federated.sort();
        f.debug_struct("Authenticator")
            .field("federated", &federated)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

pub struct AuthenticatorBuilder {
    channel: Arc<dyn RpcChannel>,
    issuer: TokenIssuer,
    timeout: Duration,
    config: Config,
    federations: Vec<String>,
    custom: HashMap<String, Arc<dyn IdentityProvider>>,
    local: Option<Arc<dyn IdentityProvider>>,
}

impl AuthenticatorBuilder {
    fn new(channel: Arc<dyn RpcChannel>, issuer: TokenIssuer) -> Self {
        Self {
            channel,
            issuer,
            timeout: DEFAULT_TIMEOUT,
            config: Config::default(),
            federations: vec![DEFAULT_FEDERATION.to_string()],
            custom: HashMap::new(),
            local: None,
        }
    }

    /// Per-call timeout for every request on the channel.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Replace the set of recognized federated provider names.
    #[must_use]
    pub fn federations<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.federations = names.into_iter().map(Into::into).collect();
        self
    }

    /// Register a provider implementation under `kind`; `local` replaces the
    /// built-in password check.
    #[must_use]
    pub fn provider(mut self, kind: &str, provider: Arc<dyn IdentityProvider>) -> Self {
        match ProviderKind::parse(kind) {
            ProviderKind::Local => self.local = Some(provider),
            ProviderKind::Federated(name) => {
                self.custom.insert(name, provider);
            }
        }
        self
    }

    #[must_use]
    pub fn build(self) -> Authenticator {
        let directory = UserDirectory::new(self.channel.clone(), self.timeout);

        let local = self
            .local
            .unwrap_or_else(|| Arc::new(LocalProvider::new(directory.clone())));

        let mut federated: HashMap<String, Arc<dyn IdentityProvider>> = self
            .federations
            .into_iter()
            .filter(|name| name != provider::LOCAL)
            .map(|name| {
                let provider: Arc<dyn IdentityProvider> = Arc::new(FederatedProvider::new(
                    name.clone(),
                    self.channel.clone(),
                    self.timeout,
                ));
                (name, provider)
            })
            .collect();
        federated.extend(self.custom);

        Authenticator {
            local,
            federated,
            directory,
            mfa: MfaVerifier::new(self.channel.clone(), self.timeout),
            issuer: self.issuer,
            config: SharedConfig::new(self.config),
            timeout: self.timeout,
        }
    }
}

use super::{Credentials, Error};
use async_trait::async_trait;
use std::fmt;

pub const LOCAL: &str = "local";

/// A configured provider type, resolved from its configuration string.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    Local,
    Federated(String),
}

impl ProviderKind {
    #[must_use]
    pub fn parse(kind: &str) -> Self {
        if kind == LOCAL {
            Self::Local
        } else {
            Self::Federated(kind.to_string())
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Local => LOCAL,
            Self::Federated(name) => name,
        }
    }

    #[must_use]
    pub fn is_local(&self) -> bool {
        matches!(self, Self::Local)
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a successful credential check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Verdict {
    pub admin: bool,
}

/// Something that can vouch for a username/password pair.
///
/// A rejection is an `Err`; the orchestrator moves on to the next provider.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn verify(&self, credentials: &Credentials) -> Result<Verdict, Error>;
}

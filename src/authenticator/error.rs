use crate::rpc::RpcError;
use thiserror::Error;

/// Message returned to callers for every failed authentication.
pub const AUTHENTICATION_FAILED: &str = "Authentication failed";

#[derive(Debug, Error)]
pub enum Error {
    /// The only error `Authenticator::authenticate` hands back to callers.
    #[error("Authentication failed")]
    Unauthorized,

    #[error("missing username")]
    MissingUsername,

    #[error("unknown provider type: {0}")]
    UnknownProvider(String),

    #[error("user not found")]
    UserNotFound,

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("provider {provider} rejected credentials: {message}")]
    Rejected { provider: String, message: String },

    #[error("verification code rejected: {0}")]
    MfaRejected(String),

    #[error(transparent)]
    Rpc(#[from] RpcError),

    #[error("malformed reply from {subject}: {source}")]
    Malformed {
        subject: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid base64 in stored {0}")]
    Encoding(&'static str),

    #[error("key derivation failed")]
    Kdf,

    #[error("user store error on {subject}: {message}")]
    Store { subject: String, message: String },

    #[error("could not provision user {username}: {message}")]
    Provisioning { username: String, message: String },

    #[error("token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    #[error("configuration error: {0}")]
    Configuration(String),
}

impl Error {
    pub(crate) fn malformed(subject: &str, source: serde_json::Error) -> Self {
        Self::Malformed {
            subject: subject.to_string(),
            source,
        }
    }

    /// Client-safe message; never reveals which provider, account or step failed.
    #[must_use]
    pub fn client_message(&self) -> &'static str {
        AUTHENTICATION_FAILED
    }
}

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

/// Input of an authentication attempt, as received on `authentication.get`.
#[derive(Debug, Clone, Deserialize)]
pub struct Credentials {
    #[serde(default)]
    pub username: String,
    #[serde(default = "empty_secret")]
    pub password: SecretString,
    #[serde(default)]
    pub verification_code: Option<String>,
}

fn empty_secret() -> SecretString {
    SecretString::default()
}

impl Credentials {
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: SecretString::from(password.into()),
            verification_code: None,
        }
    }

    #[must_use]
    pub fn with_verification_code(mut self, code: impl Into<String>) -> Self {
        self.verification_code = Some(code.into());
        self
    }

    /// The verification code, if one was supplied; an empty string counts as none.
    #[must_use]
    pub fn verification_code(&self) -> Option<&str> {
        self.verification_code
            .as_deref()
            .filter(|code| !code.is_empty())
    }

    /// Wire form forwarded to federated providers.
    pub(crate) fn to_provider_request(&self) -> ProviderRequest<'_> {
        ProviderRequest {
            username: &self.username,
            password: self.password.expose_secret(),
            verification_code: self.verification_code(),
        }
    }
}

#[derive(Serialize)]
pub(crate) struct ProviderRequest<'a> {
    pub(crate) username: &'a str,
    pub(crate) password: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) verification_code: Option<&'a str>,
}

/// Reply published on `authentication.get`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthResponse {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl AuthResponse {
    #[must_use]
    pub fn granted(token: String) -> Self {
        Self {
            ok: true,
            token: Some(token),
            message: None,
        }
    }

    #[must_use]
    pub fn denied(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            token: None,
            message: Some(message.into()),
        }
    }
}

//! HS256 session tokens.

use super::Error;
use jsonwebtoken::{
    decode, encode, get_current_timestamp, Algorithm, DecodingKey, EncodingKey, Header,
    Validation,
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_EXPIRY: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    /// Same as `sub`; kept for consumers that read the username claim.
    pub username: String,
    pub admin: bool,
    pub iat: u64,
    pub exp: u64,
}

/// Signs claims with a secret shared with the services that verify tokens.
#[derive(Clone)]
pub struct TokenIssuer {
    secret: SecretString,
}

impl TokenIssuer {
    /// # Errors
    /// Returns [`Error::Configuration`] if the secret is empty.
    pub fn new(secret: SecretString) -> Result<Self, Error> {
        if secret.expose_secret().is_empty() {
            return Err(Error::Configuration("token signing secret is empty".to_string()));
        }
        Ok(Self { secret })
    }

    /// Sign a token for `username` valid for `expiry` (24 hours when zero).
    ///
    /// # Errors
    /// Returns an error if the secret is empty or encoding fails.
    pub fn issue(&self, username: &str, admin: bool, expiry: Duration) -> Result<String, Error> {
        let secret = self.secret.expose_secret();
        if secret.is_empty() {
            return Err(Error::Configuration("token signing secret is empty".to_string()));
        }

        let expiry = if expiry.is_zero() { DEFAULT_EXPIRY } else { expiry };
        let now = get_current_timestamp();
        let claims = Claims {
            sub: username.to_string(),
            username: username.to_string(),
            admin,
            iat: now,
            exp: now.saturating_add(expiry.as_secs()),
        };

        Ok(encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )?)
    }

    /// Decode and validate a token signed by this issuer.
    ///
    /// # Errors
    /// Returns an error if the signature is invalid or the token has expired.
    pub fn verify(&self, token: &str) -> Result<Claims, Error> {
        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.expose_secret().as_bytes()),
            &Validation::new(Algorithm::HS256),
        )?;
        Ok(data.claims)
    }
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("secret", &"***")
            .finish()
    }
}

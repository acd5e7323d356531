use super::{
    directory::UserDirectory,
    password,
    provider::{IdentityProvider, Verdict},
    Credentials, Error,
};
use async_trait::async_trait;
use secrecy::ExposeSecret;
use tracing::instrument;

/// Verifies credentials against the salted hash kept in the user store.
#[derive(Clone)]
pub struct LocalProvider {
    directory: UserDirectory,
}

impl LocalProvider {
    #[must_use]
    pub fn new(directory: UserDirectory) -> Self {
        Self { directory }
    }
}

#[async_trait]
impl IdentityProvider for LocalProvider {
    #[instrument(skip(self, credentials), fields(username = %credentials.username))]
    async fn verify(&self, credentials: &Credentials) -> Result<Verdict, Error> {
        let user = self
            .directory
            .get(&credentials.username)
            .await?
            .ok_or(Error::UserNotFound)?;

        if user.username != credentials.username {
            return Err(Error::UserNotFound);
        }

        let matches = password::verify_password(
            credentials.password.expose_secret(),
            &user.password,
            &user.salt,
        )?;

        if matches {
            Ok(Verdict { admin: user.admin })
        } else {
            Err(Error::InvalidCredentials)
        }
    }
}

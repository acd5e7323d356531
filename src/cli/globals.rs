use secrecy::SecretString;
use std::time::Duration;

/// Settings shared by every action: how to reach the bus and how to sign tokens.
#[derive(Clone)]
pub struct GlobalArgs {
    pub nats_url: String,
    pub rpc_timeout: Duration,
    pub jwt_secret: SecretString,
}

impl GlobalArgs {
    #[must_use]
    pub fn new(nats_url: String, rpc_timeout: Duration, jwt_secret: SecretString) -> Self {
        Self {
            nats_url,
            rpc_timeout,
            jwt_secret,
        }
    }
}

impl std::fmt::Debug for GlobalArgs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GlobalArgs")
            .field("nats_url", &self.nats_url)
            .field("rpc_timeout", &self.rpc_timeout)
            .field("jwt_secret", &"***")
            .finish()
    }
}

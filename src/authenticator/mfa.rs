use super::Error;
use crate::rpc::RpcChannel;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::instrument;

pub const MFA_SUBJECT: &str = "mfa.auth";

#[derive(Serialize)]
struct MfaRequest<'a> {
    username: &'a str,
    verification_code: &'a str,
}

#[derive(Deserialize)]
struct MfaReply {
    ok: bool,
    #[serde(default)]
    message: Option<String>,
}

/// Checks step-up verification codes with the MFA service.
#[derive(Clone)]
pub struct MfaVerifier {
    channel: Arc<dyn RpcChannel>,
    timeout: Duration,
}

impl MfaVerifier {
    #[must_use]
    pub fn new(channel: Arc<dyn RpcChannel>, timeout: Duration) -> Self {
        Self { channel, timeout }
    }

    /// # Errors
    /// Returns [`Error::MfaRejected`] when the code is refused, or an error if the
    /// request fails or the reply cannot be parsed.
    #[instrument(skip(self, code))]
    pub async fn verify(&self, username: &str, code: &str) -> Result<(), Error> {
        let payload = serde_json::to_vec(&MfaRequest {
            username,
            verification_code: code,
        })
        .map_err(|e| Error::malformed(MFA_SUBJECT, e))?;

        let reply = self
            .channel
            .request(MFA_SUBJECT, payload, self.timeout)
            .await?;

        let reply: MfaReply =
            serde_json::from_slice(&reply).map_err(|e| Error::malformed(MFA_SUBJECT, e))?;

        if reply.ok {
            Ok(())
        } else {
            Err(Error::MfaRejected(
                reply
                    .message
                    .unwrap_or_else(|| "verification failed".to_string()),
            ))
        }
    }
}

use super::{RpcChannel, RpcError};
use async_nats::{client::RequestErrorKind, Client};
use async_trait::async_trait;
use bytes::Bytes;
use std::time::Duration;
use tracing::{debug, instrument};

/// [`RpcChannel`] backed by a NATS connection.
#[derive(Clone, Debug)]
pub struct NatsChannel {
    client: Client,
}

impl NatsChannel {
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl RpcChannel for NatsChannel {
    #[instrument(skip(self, payload))]
    async fn request(
        &self,
        subject: &str,
        payload: Vec<u8>,
        timeout: Duration,
    ) -> Result<Vec<u8>, RpcError> {
        let request = self
            .client
            .request(subject.to_string(), Bytes::from(payload));

        let message = match tokio::time::timeout(timeout, request).await {
            Ok(Ok(message)) => message,
            Ok(Err(e)) => {
                debug!("request to {} failed: {}", subject, e);

                return Err(match e.kind() {
                    RequestErrorKind::TimedOut => RpcError::Timeout {
                        subject: subject.to_string(),
                    },
                    RequestErrorKind::NoResponders => RpcError::NoResponders {
                        subject: subject.to_string(),
                    },
                    _ => RpcError::Transport {
                        subject: subject.to_string(),
                        message: e.to_string(),
                    },
                });
            }
            Err(_) => {
                return Err(RpcError::Timeout {
                    subject: subject.to_string(),
                })
            }
        };

        Ok(message.payload.to_vec())
    }
}

//! Request/reply channel used to reach providers, the user store and the MFA service.

pub mod memory;
pub mod nats;

pub use memory::MemoryChannel;
pub use nats::NatsChannel;

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Default per-call timeout for every outbound request.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(1);

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RpcError {
    #[error("request to {subject} timed out")]
    Timeout { subject: String },
    #[error("no responders for {subject}")]
    NoResponders { subject: String },
    #[error("request to {subject} failed: {message}")]
    Transport { subject: String, message: String },
}

/// A synchronous-looking request/reply primitive.
///
/// Implementations must honour `timeout` and report an expired call as
/// [`RpcError::Timeout`]; they never retry.
#[async_trait]
pub trait RpcChannel: Send + Sync {
    async fn request(
        &self,
        subject: &str,
        payload: Vec<u8>,
        timeout: Duration,
    ) -> Result<Vec<u8>, RpcError>;
}

use super::{RpcChannel, RpcError};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::Duration;

type Handler = Arc<dyn Fn(&[u8]) -> Result<Vec<u8>, RpcError> + Send + Sync>;

/// A single recorded request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub subject: String,
    pub payload: Vec<u8>,
    pub timeout: Duration,
}

/// In-process [`RpcChannel`]: replies come from per-subject handlers and every
/// request is journaled, including those nobody answers.
#[derive(Default)]
pub struct MemoryChannel {
    handlers: RwLock<HashMap<String, Handler>>,
    journal: Mutex<Vec<Call>>,
}

impl MemoryChannel {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the responder for `subject`.
    pub fn handle<F>(&self, subject: &str, handler: F)
    where
        F: Fn(&[u8]) -> Result<Vec<u8>, RpcError> + Send + Sync + 'static,
    {
        self.handlers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(subject.to_string(), Arc::new(handler));
    }

    /// Register a responder that always answers with `reply`.
    pub fn reply(&self, subject: &str, reply: &str) {
        let reply = reply.as_bytes().to_vec();
        self.handle(subject, move |_| Ok(reply.clone()));
    }

    /// Payloads sent to `subject`, oldest first.
    #[must_use]
    pub fn calls(&self, subject: &str) -> Vec<Vec<u8>> {
        self.journal
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|call| call.subject == subject)
            .map(|call| call.payload.clone())
            .collect()
    }

    #[must_use]
    pub fn count(&self, subject: &str) -> usize {
        self.journal
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|call| call.subject == subject)
            .count()
    }

    /// Every request in the order it was made.
    #[must_use]
    pub fn journal(&self) -> Vec<Call> {
        self.journal
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl std::fmt::Debug for MemoryChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let subjects: Vec<String> = self
            .handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        f.debug_struct("MemoryChannel")
            .field("subjects", &subjects)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl RpcChannel for MemoryChannel {
    async fn request(
        &self,
        subject: &str,
        payload: Vec<u8>,
        timeout: Duration,
    ) -> Result<Vec<u8>, RpcError> {
        self.journal
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Call {
                subject: subject.to_string(),
                payload: payload.clone(),
                timeout,
            });

        let handler = self
            .handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(subject)
            .cloned();

        match handler {
            Some(handler) => handler(&payload),
            None => Err(RpcError::NoResponders {
                subject: subject.to_string(),
            }),
        }
    }
}

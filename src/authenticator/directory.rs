use super::Error;
use crate::rpc::RpcChannel;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument};

pub const USER_GET_SUBJECT: &str = "user.get";
pub const USER_SET_SUBJECT: &str = "user.set";

/// User record as served by the user store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct UserRecord {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub salt: String,
    #[serde(default, rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub admin: bool,
    #[serde(default, rename = "_code")]
    code: Option<String>,
    #[serde(default, rename = "_error")]
    error: Option<String>,
}

enum Lookup {
    Found,
    Absent,
    Failed(String),
}

impl UserRecord {
    fn lookup(&self) -> Lookup {
        match (self.code.as_deref(), self.error.as_deref()) {
            (Some("404"), _) => Lookup::Absent,
            (Some(code), error) => Lookup::Failed(format!(
                "code {code}: {}",
                error.unwrap_or("no message")
            )),
            (None, Some(error)) => Lookup::Failed(error.to_string()),
            (None, None) if self.id == 0 => Lookup::Absent,
            (None, None) => Lookup::Found,
        }
    }
}

#[derive(Serialize)]
struct NewUser<'a> {
    username: &'a str,
    #[serde(rename = "type")]
    kind: &'a str,
    admin: bool,
}

#[derive(Deserialize)]
struct SetReply {
    #[serde(default)]
    id: Option<i64>,
    #[serde(default, rename = "_error")]
    error: Option<String>,
}

/// Client for the user store reached over `user.get` / `user.set`.
#[derive(Clone)]
pub struct UserDirectory {
    channel: Arc<dyn RpcChannel>,
    timeout: Duration,
}

impl UserDirectory {
    #[must_use]
    pub fn new(channel: Arc<dyn RpcChannel>, timeout: Duration) -> Self {
        Self { channel, timeout }
    }

    /// Look up a user; `Ok(None)` when the store does not know the username.
    ///
    /// # Errors
    /// Returns [`Error::Store`] when the store answers with an error other than
    /// not-found, or an error if the request fails or the reply cannot be parsed.
    #[instrument(skip(self))]
    pub async fn get(&self, username: &str) -> Result<Option<UserRecord>, Error> {
        let payload = json!({ "username": username }).to_string().into_bytes();
        let reply = self
            .channel
            .request(USER_GET_SUBJECT, payload, self.timeout)
            .await?;

        let record: UserRecord =
            serde_json::from_slice(&reply).map_err(|e| Error::malformed(USER_GET_SUBJECT, e))?;

        match record.lookup() {
            Lookup::Found => Ok(Some(record)),
            Lookup::Absent => {
                debug!("user {} not found", username);
                Ok(None)
            }
            Lookup::Failed(message) => Err(Error::Store {
                subject: USER_GET_SUBJECT.to_string(),
                message,
            }),
        }
    }

    /// Create a user record owned by provider `kind`.
    ///
    /// # Errors
    /// Returns [`Error::Provisioning`] when the store refuses the record, or an
    /// error if the request fails or the reply cannot be parsed.
    #[instrument(skip(self))]
    pub async fn create(&self, username: &str, kind: &str, admin: bool) -> Result<(), Error> {
        let payload = serde_json::to_vec(&NewUser {
            username,
            kind,
            admin,
        })
        .map_err(|e| Error::malformed(USER_SET_SUBJECT, e))?;

        let reply = self
            .channel
            .request(USER_SET_SUBJECT, payload, self.timeout)
            .await?;

        let reply: SetReply =
            serde_json::from_slice(&reply).map_err(|e| Error::malformed(USER_SET_SUBJECT, e))?;

        if let Some(message) = reply.error {
            return Err(Error::Provisioning {
                username: username.to_string(),
                message,
            });
        }

        if reply.id == Some(0) {
            return Err(Error::Provisioning {
                username: username.to_string(),
                message: "user store returned id 0".to_string(),
            });
        }

        debug!("provisioned {} user {}", kind, username);

        Ok(())
    }
}

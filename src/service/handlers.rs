use crate::authenticator::{
    config::Config, AuthResponse, Authenticator, Credentials, AUTHENTICATION_FAILED,
};
use crate::rpc::RpcChannel;
use tracing::{error, info, instrument, warn};

const INVALID_REQUEST: &str = "Invalid request";

/// Handle one `authentication.get` request body and build the reply body.
#[instrument(skip_all)]
pub async fn authentication_get(authenticator: &Authenticator, payload: &[u8]) -> Vec<u8> {
    let response = match serde_json::from_slice::<Credentials>(payload) {
        Ok(credentials) => match authenticator.authenticate(&credentials).await {
            Ok(token) => AuthResponse::granted(token),
            Err(e) => AuthResponse::denied(e.client_message()),
        },
        Err(e) => {
            warn!("could not decode authentication request: {}", e);
            AuthResponse::denied(INVALID_REQUEST)
        }
    };

    encode(&response)
}

fn encode(response: &AuthResponse) -> Vec<u8> {
    serde_json::to_vec(response).unwrap_or_else(|e| {
        error!("could not encode authentication reply: {}", e);
        format!(r#"{{"ok":false,"message":"{AUTHENTICATION_FAILED}"}}"#).into_bytes()
    })
}

/// Re-read the configuration document and install it.
///
/// On failure the running configuration is kept.
#[instrument(skip_all)]
pub async fn config_set(authenticator: &Authenticator, channel: &dyn RpcChannel) {
    match Config::fetch(channel, authenticator.timeout()).await {
        Ok(config) => {
            authenticator.config().replace(config);
            info!("reloaded authenticator configuration");
        }
        Err(e) => error!("could not reload configuration: {}", e),
    }
}

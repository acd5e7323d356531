use crate::{
    authenticator::{Authenticator, Config, TokenIssuer},
    cli::{globals::GlobalArgs, telemetry},
    rpc::{NatsChannel, RpcChannel},
    service, APP_USER_AGENT,
};
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Debug)]
pub struct Args {
    pub globals: GlobalArgs,
    pub port: u16,
    pub providers: String,
    pub federations: Vec<String>,
    pub expiry_hours: u64,
    pub remote_config: bool,
}

/// Execute the server action.
/// # Errors
/// Returns an error if the signing secret is unusable, the bus cannot be reached,
/// or the service fails while running.
pub async fn execute(args: Args) -> Result<()> {
    let issuer = TokenIssuer::new(args.globals.jwt_secret.clone())
        .context("invalid token signing secret")?;

    let client = async_nats::ConnectOptions::new()
        .name(APP_USER_AGENT)
        .connect(args.globals.nats_url.as_str())
        .await
        .with_context(|| format!("Unable to connect to NATS at {}", args.globals.nats_url))?;

    info!("connected to {}", args.globals.nats_url);

    let channel: Arc<dyn RpcChannel> = Arc::new(NatsChannel::new(client.clone()));

    let mut config = Config::from_provider_list(&args.providers).with_expiry_hours(args.expiry_hours);

    if args.remote_config {
        match Config::fetch(&*channel, args.globals.rpc_timeout).await {
            Ok(remote) => config = remote,
            Err(e) => warn!("could not fetch remote configuration, using local settings: {}", e),
        }
    }

    let authenticator = Authenticator::builder(channel, issuer)
        .timeout(args.globals.rpc_timeout)
        .federations(args.federations)
        .config(config)
        .build();

    let result = service::serve(client, Arc::new(authenticator), args.remote_config, args.port).await;

    telemetry::shutdown_tracer();

    result
}

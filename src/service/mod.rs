//! Bus-facing service: answers `authentication.get`, follows configuration
//! changes and exposes an HTTP health endpoint.

pub mod handlers;
pub mod health;

use crate::authenticator::{config::CONFIG_SET_SUBJECT, Authenticator};
use crate::rpc::{NatsChannel, RpcChannel};
use anyhow::{Context, Result};
use async_nats::{Client, Subscriber};
use axum::{routing::get, Router};
use bytes::Bytes;
use futures::StreamExt;
use std::future::IntoFuture;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{debug, error, info};

pub const AUTHENTICATION_SUBJECT: &str = "authentication.get";

/// Serve until the subscriptions close or Ctrl-C is received.
///
/// # Errors
/// Returns an error if subscribing or binding the health listener fails.
pub async fn serve(
    client: Client,
    authenticator: Arc<Authenticator>,
    remote_config: bool,
    port: u16,
) -> Result<()> {
    let requests = client
        .subscribe(AUTHENTICATION_SUBJECT)
        .await
        .with_context(|| format!("Unable to subscribe to '{AUTHENTICATION_SUBJECT}'"))?;

    let reloads = if remote_config {
        Some(
            client
                .subscribe(CONFIG_SET_SUBJECT)
                .await
                .with_context(|| format!("Unable to subscribe to '{CONFIG_SET_SUBJECT}'"))?,
        )
    } else {
        None
    };

    let listener = TcpListener::bind(format!("::0:{port}"))
        .await
        .with_context(|| format!("Unable to bind health listener on port {port}"))?;
    let app = Router::new().route("/health", get(health::health));

    info!("listening on '{}', health on port {}", AUTHENTICATION_SUBJECT, port);

    tokio::select! {
        () = answer(client.clone(), requests, authenticator.clone()) => {
            info!("'{}' subscription closed", AUTHENTICATION_SUBJECT);
        }
        () = follow_config(client.clone(), reloads, authenticator) => {
            info!("'{}' subscription closed", CONFIG_SET_SUBJECT);
        }
        result = axum::serve(listener, app.into_make_service()).into_future() => {
            result.context("health server failed")?;
        }
        _ = tokio::signal::ctrl_c() => {
            info!("shutting down");
        }
    }

    client.flush().await.context("failed to flush NATS client")?;

    Ok(())
}

/// Answer each request in its own task.
async fn answer(client: Client, mut requests: Subscriber, authenticator: Arc<Authenticator>) {
    while let Some(message) = requests.next().await {
        let Some(reply) = message.reply.clone() else {
            debug!("dropping '{}' message without reply subject", message.subject);
            continue;
        };

        let client = client.clone();
        let authenticator = authenticator.clone();

        tokio::spawn(async move {
            let body = handlers::authentication_get(&authenticator, &message.payload).await;

            if let Err(e) = client.publish(reply, Bytes::from(body)).await {
                error!("could not publish authentication reply: {}", e);
            }
        });
    }
}

async fn follow_config(
    client: Client,
    reloads: Option<Subscriber>,
    authenticator: Arc<Authenticator>,
) {
    let Some(mut reloads) = reloads else {
        return std::future::pending().await;
    };

    let channel = NatsChannel::new(client);

    while reloads.next().await.is_some() {
        handlers::config_set(&authenticator, &channel as &dyn RpcChannel).await;
    }
}

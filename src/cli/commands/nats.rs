use anyhow::{bail, Context};
use clap::{Arg, ArgMatches, Command};
use std::time::Duration;
use url::Url;

pub const ARG_NATS_URL: &str = "nats-url";
pub const ARG_RPC_TIMEOUT_MS: &str = "rpc-timeout-ms";

#[derive(Debug, Clone)]
pub struct Options {
    pub url: String,
    pub timeout: Duration,
}

impl Options {
    /// Parse bus arguments from matches.
    ///
    /// # Errors
    /// Returns an error if the URL is missing, unparsable or not a NATS URL.
    pub fn parse(matches: &ArgMatches) -> anyhow::Result<Self> {
        let url = matches
            .get_one::<String>(ARG_NATS_URL)
            .cloned()
            .filter(|v| !v.trim().is_empty())
            .with_context(|| format!("missing required argument: --{ARG_NATS_URL}"))?;

        let parsed = Url::parse(&url).with_context(|| format!("invalid --{ARG_NATS_URL}: {url}"))?;
        if !matches!(parsed.scheme(), "nats" | "tls" | "ws" | "wss") {
            bail!("unsupported scheme in --{ARG_NATS_URL}: {}", parsed.scheme());
        }

        let timeout_ms = matches
            .get_one::<u64>(ARG_RPC_TIMEOUT_MS)
            .copied()
            .unwrap_or(1000);
        if timeout_ms == 0 {
            bail!("--{ARG_RPC_TIMEOUT_MS} must be greater than zero");
        }

        Ok(Self {
            url,
            timeout: Duration::from_millis(timeout_ms),
        })
    }
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_NATS_URL)
                .long(ARG_NATS_URL)
                .help("NATS server URL")
                .env("NATS_URI")
                .default_value("nats://127.0.0.1:4222"),
        )
        .arg(
            Arg::new(ARG_RPC_TIMEOUT_MS)
                .long(ARG_RPC_TIMEOUT_MS)
                .help("Timeout in milliseconds for each request to providers, user store and MFA")
                .env("AUTHENTICATOR_RPC_TIMEOUT_MS")
                .default_value("1000")
                .value_parser(clap::value_parser!(u64)),
        )
}

use anyhow::bail;
use clap::{Arg, ArgAction, ArgMatches, Command};
use secrecy::SecretString;

pub const ARG_JWT_SECRET: &str = "jwt-secret";
pub const ARG_PROVIDERS: &str = "providers";
pub const ARG_FEDERATIONS: &str = "federations";
pub const ARG_EXPIRY_HOURS: &str = "expiry-hours";
pub const ARG_REMOTE_CONFIG: &str = "remote-config";

#[derive(Debug, Clone)]
pub struct Options {
    pub jwt_secret: SecretString,
    pub providers: String,
    pub federations: Vec<String>,
    pub expiry_hours: u64,
    pub remote_config: bool,
}

impl Options {
    /// Parse authentication arguments from matches.
    ///
    /// # Errors
    /// Returns an error if the signing secret is missing or empty.
    pub fn parse(matches: &ArgMatches) -> anyhow::Result<Self> {
        let jwt_secret = match matches.get_one::<String>(ARG_JWT_SECRET) {
            Some(secret) if !secret.trim().is_empty() => SecretString::from(secret.clone()),
            _ => bail!("missing required argument: --{ARG_JWT_SECRET}"),
        };

        let federations = matches
            .get_one::<String>(ARG_FEDERATIONS)
            .map(|list| {
                list.split(',')
                    .map(str::trim)
                    .filter(|name| !name.is_empty())
                    .map(ToString::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            jwt_secret,
            providers: matches
                .get_one::<String>(ARG_PROVIDERS)
                .cloned()
                .unwrap_or_default(),
            federations,
            expiry_hours: matches
                .get_one::<u64>(ARG_EXPIRY_HOURS)
                .copied()
                .unwrap_or(24),
            remote_config: matches.get_flag(ARG_REMOTE_CONFIG),
        })
    }
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_JWT_SECRET)
                .long(ARG_JWT_SECRET)
                .help("Secret used to sign session tokens (HS256)")
                .env("JWT_SECRET")
                .hide_env_values(true),
        )
        .arg(
            Arg::new(ARG_PROVIDERS)
                .long(ARG_PROVIDERS)
                .help("Comma separated provider types, tried in order")
                .env("AUTHENTICATOR_PROVIDERS")
                .default_value("local,federation"),
        )
        .arg(
            Arg::new(ARG_FEDERATIONS)
                .long(ARG_FEDERATIONS)
                .help("Comma separated federated provider names this service recognizes")
                .env("AUTHENTICATOR_FEDERATIONS")
                .default_value("federation"),
        )
        .arg(
            Arg::new(ARG_EXPIRY_HOURS)
                .long(ARG_EXPIRY_HOURS)
                .help("Token lifetime in hours (0 means 24)")
                .env("AUTHENTICATOR_TOKEN_EXPIRY_HOURS")
                .default_value("24")
                .value_parser(clap::value_parser!(u64)),
        )
        .arg(
            Arg::new(ARG_REMOTE_CONFIG)
                .long(ARG_REMOTE_CONFIG)
                .help("Load providers from the config service and reload on config.set.authenticator")
                .env("AUTHENTICATOR_REMOTE_CONFIG")
                .action(ArgAction::SetTrue),
        )
}

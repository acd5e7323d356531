//! Maps validated CLI arguments to the action to run.

use crate::cli::actions::{server::Args, Action};
use crate::cli::commands::{auth, nats, ARG_PORT};
use crate::cli::globals::GlobalArgs;
use anyhow::Result;

/// Map validated CLI matches to a server action.
///
/// # Errors
/// Returns an error if required arguments are missing or invalid.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches.get_one::<u16>(ARG_PORT).copied().unwrap_or(8080);

    let nats_opts = nats::Options::parse(matches)?;
    let auth_opts = auth::Options::parse(matches)?;

    Ok(Action::Server(Args {
        globals: GlobalArgs::new(nats_opts.url, nats_opts.timeout, auth_opts.jwt_secret),
        port,
        providers: auth_opts.providers,
        federations: auth_opts.federations,
        expiry_hours: auth_opts.expiry_hours,
        remote_config: auth_opts.remote_config,
    }))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::cli::commands;
    use secrecy::ExposeSecret;
    use std::time::Duration;

    fn matches(args: &[&str]) -> clap::ArgMatches {
        let mut argv = vec!["authenticator"];
        argv.extend_from_slice(args);
        commands::new().get_matches_from(argv)
    }

    fn unset() -> [(&'static str, Option<&'static str>); 4] {
        [
            ("JWT_SECRET", None),
            ("NATS_URI", None),
            ("AUTHENTICATOR_FEDERATIONS", None),
            ("AUTHENTICATOR_RPC_TIMEOUT_MS", None),
        ]
    }

    #[test]
    fn jwt_secret_required() {
        temp_env::with_vars(unset(), || {
            let err = handler(&matches(&[])).unwrap_err();
            assert!(err.to_string().contains("--jwt-secret"));
        });
    }

    #[test]
    fn blank_jwt_secret_rejected() {
        temp_env::with_vars(unset(), || {
            let err = handler(&matches(&["--jwt-secret", "   "])).unwrap_err();
            assert!(err.to_string().contains("--jwt-secret"));
        });
    }

    #[test]
    fn invalid_nats_url_rejected() {
        temp_env::with_vars(unset(), || {
            let result = handler(&matches(&["--jwt-secret", "s", "--nats-url", "not a url"]));
            assert!(result.is_err());

            let result = handler(&matches(&[
                "--jwt-secret",
                "s",
                "--nats-url",
                "http://127.0.0.1:4222",
            ]));
            assert!(result.is_err());
        });
    }

    #[test]
    fn zero_timeout_rejected() {
        temp_env::with_vars(unset(), || {
            let result = handler(&matches(&["--jwt-secret", "s", "--rpc-timeout-ms", "0"]));
            assert!(result.is_err());
        });
    }

    #[test]
    fn server_action() {
        temp_env::with_vars(unset(), || {
            let action = handler(&matches(&[
                "--jwt-secret",
                "signing-key",
                "--federations",
                "corp, partner,,",
                "--rpc-timeout-ms",
                "250",
                "--port",
                "9000",
            ]))
            .unwrap();

            let Action::Server(args) = action;
            assert_eq!(args.port, 9000);
            assert_eq!(args.globals.nats_url, "nats://127.0.0.1:4222");
            assert_eq!(args.globals.rpc_timeout, Duration::from_millis(250));
            assert_eq!(args.globals.jwt_secret.expose_secret(), "signing-key");
            assert_eq!(args.providers, "local,federation");
            assert_eq!(args.federations, vec!["corp", "partner"]);
            assert_eq!(args.expiry_hours, 24);
            assert!(!args.remote_config);
        });
    }
}

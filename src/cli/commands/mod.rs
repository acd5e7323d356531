pub mod auth;
pub mod logging;
pub mod nats;

use clap::{
    builder::styling::{AnsiColor, Effects, Styles},
    Arg, ColorChoice, Command,
};

pub const ARG_PORT: &str = "port";

#[must_use]
pub fn new() -> Command {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    let git_hash = crate::GIT_COMMIT_HASH;
    let long_version: &'static str =
        Box::leak(format!("{} - {}", env!("CARGO_PKG_VERSION"), git_hash).into_boxed_str());

    let command = Command::new("authenticator")
        .about("Verifies credentials against local and federated providers and issues session tokens")
        .version(env!("CARGO_PKG_VERSION"))
        .long_version(long_version)
        .color(ColorChoice::Auto)
        .styles(styles)
        .arg(
            Arg::new(ARG_PORT)
                .short('p')
                .long(ARG_PORT)
                .help("Port for the HTTP health endpoint")
                .default_value("8080")
                .env("AUTHENTICATOR_PORT")
                .value_parser(clap::value_parser!(u16)),
        );

    let command = nats::with_args(command);
    let command = auth::with_args(command);
    logging::with_args(command)
}

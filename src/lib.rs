//! # Authenticator
//!
//! `authenticator` verifies a username/password pair against an ordered list of
//! identity providers and, on success, issues a signed session token (HS256 JWT).
//!
//! ## Providers
//!
//! - **`local`:** the user record is fetched from the user store and the password is
//!   checked against its salted scrypt hash in constant time.
//! - **Federated:** credentials are forwarded to `<provider>.auth` on the bus and the
//!   remote side reports success and the admin flag.
//!
//! Providers are tried in configured order; the first success wins and later
//! providers are never contacted. A user authenticated by a federated provider
//! gets a local record the first time they log in.
//!
//! ## Step-up verification
//!
//! When a verification code is supplied it must be accepted by `mfa.auth`,
//! otherwise the whole attempt fails.
//!
//! ## Failure masking
//!
//! Callers only ever see "Authentication failed". The actual cause (unknown user,
//! wrong password, provider outage, rejected code) is logged server side.

pub mod authenticator;
pub mod cli;
pub mod rpc;
pub mod service;

pub use authenticator::{Authenticator, Credentials, Error};

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);

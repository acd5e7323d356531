#![allow(clippy::unwrap_used)]

use authenticator::authenticator::{Config, TokenIssuer};
use authenticator::rpc::{MemoryChannel, RpcError};
use authenticator::service::handlers;
use authenticator::{Authenticator, Credentials, Error};
use secrecy::SecretString;
use serde_json::{json, Value};
use std::sync::Arc;

const SECRET: &str = "integration-signing-key";
const HASH: &str =
    "Jy7mfxUKTb2GtL+tFWQ6iXHh14SSMU7OhaAtZhrkaIUZPFhxi6CYryTIRAN2W7BCnfpWUxsVcLcqAEFcQXYzng==";
const SALT: &str = "cU1rR2JBeWJTVExRQWhCQVhNN3p1aVNVdkluMkZ4VEtGb05FU3prZFRPUT0=";

fn issuer() -> TokenIssuer {
    TokenIssuer::new(SecretString::from(SECRET.to_string())).unwrap()
}

fn authenticator(channel: &Arc<MemoryChannel>, providers: &str) -> Authenticator {
    Authenticator::builder(channel.clone(), issuer())
        .config(Config::from_provider_list(providers))
        .build()
}

fn local_user(channel: &MemoryChannel, admin: bool) {
    let record = json!({
        "id": 1,
        "username": "john",
        "password": HASH,
        "salt": SALT,
        "type": "local",
        "admin": admin,
    });
    channel.reply("user.get", &record.to_string());
}

fn unknown_user(channel: &MemoryChannel) {
    channel.reply("user.get", r#"{"_code": "404"}"#);
}

fn json(payload: &[u8]) -> Value {
    serde_json::from_slice(payload).unwrap()
}

#[tokio::test]
async fn local_user_receives_token() {
    let channel = Arc::new(MemoryChannel::new());
    local_user(&channel, true);

    channel.reply("federation.auth", r#"{"ok": true, "admin": false}"#);

    let token = authenticator(&channel, "local,federation")
        .authenticate(&Credentials::new("john", "secret"))
        .await
        .unwrap();

    let claims = issuer().verify(&token).unwrap();
    assert_eq!(claims.username, "john");
    assert!(claims.admin);
    assert_eq!(claims.exp - claims.iat, 24 * 3600);
    assert_eq!(channel.count("user.get"), 1);
    assert_eq!(channel.count("federation.auth"), 0);
    assert_eq!(channel.count("user.set"), 0);
}

#[tokio::test]
async fn wrong_password_is_unauthorized() {
    let channel = Arc::new(MemoryChannel::new());
    local_user(&channel, false);

    let result = authenticator(&channel, "local")
        .authenticate(&Credentials::new("john", "not-the-password"))
        .await;

    assert!(matches!(result, Err(Error::Unauthorized)));
    assert_eq!(channel.count("user.set"), 0);
}

#[tokio::test]
async fn unknown_user_is_unauthorized() {
    let channel = Arc::new(MemoryChannel::new());
    unknown_user(&channel);

    let result = authenticator(&channel, "local")
        .authenticate(&Credentials::new("nobody", "secret"))
        .await;

    assert!(matches!(result, Err(Error::Unauthorized)));
    assert_eq!(channel.count("user.set"), 0);
}

#[tokio::test]
async fn new_federated_user_is_provisioned() {
    let channel = Arc::new(MemoryChannel::new());
    unknown_user(&channel);
    channel.reply("federation.auth", r#"{"ok": true, "admin": true}"#);
    channel.reply("user.set", r#"{"id": 7, "username": "jane"}"#);

    let token = authenticator(&channel, "local,federation")
        .authenticate(&Credentials::new("jane", "secret"))
        .await
        .unwrap();

    assert!(issuer().verify(&token).unwrap().admin);
    // once by the local provider, once before provisioning
    assert_eq!(channel.count("user.get"), 2);
    assert_eq!(channel.count("federation.auth"), 1);

    let created = channel.calls("user.set");
    assert_eq!(created.len(), 1);
    assert_eq!(
        json(&created[0]),
        json!({"username": "jane", "type": "federation", "admin": true})
    );
}

#[tokio::test]
async fn existing_federated_user_is_not_recreated() {
    let channel = Arc::new(MemoryChannel::new());
    channel.reply(
        "user.get",
        &json!({"id": 3, "username": "jane", "type": "federation", "admin": false}).to_string(),
    );
    channel.reply("federation.auth", r#"{"ok": true}"#);

    let result = authenticator(&channel, "federation")
        .authenticate(&Credentials::new("jane", "secret"))
        .await;

    assert!(result.is_ok());
    assert_eq!(channel.count("user.get"), 1);
    assert_eq!(channel.count("user.set"), 0);
}

#[tokio::test]
async fn user_store_error_aborts_provisioning() {
    let channel = Arc::new(MemoryChannel::new());
    channel.reply("federation.auth", r#"{"ok": true}"#);
    channel.reply("user.get", r#"{"_error": "internal", "_code": "500"}"#);
    channel.reply("user.set", r#"{"id": 9}"#);

    let result = authenticator(&channel, "federation")
        .authenticate(&Credentials::new("jane", "secret"))
        .await;

    assert!(matches!(result, Err(Error::Unauthorized)));
    assert_eq!(channel.count("user.get"), 1);
    assert_eq!(channel.count("user.set"), 0);
}

#[tokio::test]
async fn null_admin_from_provider_still_grants_login() {
    let channel = Arc::new(MemoryChannel::new());
    channel.reply(
        "user.get",
        &json!({"id": 3, "username": "jane", "type": "federation"}).to_string(),
    );
    channel.reply("federation.auth", r#"{"ok": true, "admin": null}"#);

    let token = authenticator(&channel, "federation")
        .authenticate(&Credentials::new("jane", "secret"))
        .await
        .unwrap();

    assert!(!issuer().verify(&token).unwrap().admin);
}

#[tokio::test]
async fn failed_provisioning_denies_login() {
    let channel = Arc::new(MemoryChannel::new());
    unknown_user(&channel);
    channel.reply("federation.auth", r#"{"ok": true}"#);
    channel.reply("user.set", r#"{"_error": "duplicate username"}"#);

    let result = authenticator(&channel, "federation")
        .authenticate(&Credentials::new("jane", "secret"))
        .await;

    assert!(matches!(result, Err(Error::Unauthorized)));
}

#[tokio::test]
async fn rejected_verification_code_denies_login() {
    let channel = Arc::new(MemoryChannel::new());
    local_user(&channel, false);
    channel.reply("mfa.auth", r#"{"ok": false, "message": "code expired"}"#);

    let credentials = Credentials::new("john", "secret").with_verification_code("123456");
    let result = authenticator(&channel, "local").authenticate(&credentials).await;

    assert!(matches!(result, Err(Error::Unauthorized)));
    assert_eq!(
        json(&channel.calls("mfa.auth")[0]),
        json!({"username": "john", "verification_code": "123456"})
    );
}

#[tokio::test]
async fn accepted_verification_code_grants_login() {
    let channel = Arc::new(MemoryChannel::new());
    local_user(&channel, false);
    channel.reply("mfa.auth", r#"{"ok": true}"#);

    let credentials = Credentials::new("john", "secret").with_verification_code("123456");
    let result = authenticator(&channel, "local").authenticate(&credentials).await;

    assert!(result.is_ok());
    assert_eq!(channel.count("mfa.auth"), 1);
}

#[tokio::test]
async fn no_verification_code_skips_mfa() {
    let channel = Arc::new(MemoryChannel::new());
    local_user(&channel, false);

    let result = authenticator(&channel, "local")
        .authenticate(&Credentials::new("john", "secret"))
        .await;

    assert!(result.is_ok());
    assert_eq!(channel.count("mfa.auth"), 0);
}

#[tokio::test]
async fn first_successful_provider_wins() {
    let channel = Arc::new(MemoryChannel::new());
    local_user(&channel, false);
    channel.reply("federation.auth", r#"{"ok": true, "admin": true}"#);

    let token = authenticator(&channel, "federation,local")
        .authenticate(&Credentials::new("john", "secret"))
        .await
        .unwrap();

    // federation answered first, so it decides the admin flag
    assert!(issuer().verify(&token).unwrap().admin);
    assert_eq!(channel.journal()[0].subject, "federation.auth");
    // the only lookup is the provisioning check, the password is never verified locally
    assert_eq!(channel.count("user.get"), 1);
    assert_eq!(channel.count("user.set"), 0);
}

#[tokio::test]
async fn provider_timeout_falls_through() {
    let channel = Arc::new(MemoryChannel::new());
    local_user(&channel, false);
    channel.handle("federation.auth", |_| {
        Err(RpcError::Timeout {
            subject: "federation.auth".to_string(),
        })
    });

    let result = authenticator(&channel, "federation,local")
        .authenticate(&Credentials::new("john", "secret"))
        .await;

    assert!(result.is_ok());
    assert_eq!(channel.count("federation.auth"), 1);
    assert_eq!(channel.count("user.set"), 0);
}

#[tokio::test]
async fn every_provider_failing_is_unauthorized() {
    let channel = Arc::new(MemoryChannel::new());
    unknown_user(&channel);
    channel.reply("federation.auth", r#"{"ok": false, "message": "bad password"}"#);

    let result = authenticator(&channel, "local,federation")
        .authenticate(&Credentials::new("john", "secret"))
        .await;

    assert!(matches!(result, Err(Error::Unauthorized)));
}

#[tokio::test]
async fn handler_masks_failure_cause() {
    let channel = Arc::new(MemoryChannel::new());
    unknown_user(&channel);

    let auth = authenticator(&channel, "local");
    let reply = handlers::authentication_get(
        &auth,
        br#"{"username": "ghost", "password": "secret"}"#,
    )
    .await;

    assert_eq!(
        json(&reply),
        json!({"ok": false, "message": "Authentication failed"})
    );
}

#[tokio::test]
async fn config_reload_changes_provider_chain() {
    let channel = Arc::new(MemoryChannel::new());
    local_user(&channel, false);
    channel.reply("corp.auth", r#"{"ok": true}"#);
    channel.reply(
        "config.get.authenticator",
        r#"{"providers": [{"type": "corp"}], "expiry": 1}"#,
    );

    let auth = Authenticator::builder(channel.clone(), issuer())
        .federations(["corp"])
        .config(Config::from_provider_list("local"))
        .build();

    auth.authenticate(&Credentials::new("john", "secret"))
        .await
        .unwrap();
    assert_eq!(channel.count("corp.auth"), 0);

    handlers::config_set(&auth, &*channel).await;

    let token = auth
        .authenticate(&Credentials::new("john", "secret"))
        .await
        .unwrap();
    let claims = issuer().verify(&token).unwrap();
    assert_eq!(claims.exp - claims.iat, 3600);
    assert_eq!(channel.count("corp.auth"), 1);
}

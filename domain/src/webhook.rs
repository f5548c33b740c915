//! Webhook dispatch.
//!
//! `trigger` fans an event out to matching subscriptions by persisting
//! PENDING delivery attempts inside the caller's transaction. A separate
//! worker drains due attempts: it signs the canonical JSON payload with the
//! project's secret (HMAC-SHA-256, hex) and POSTs it, retrying with
//! exponential backoff until success or the attempt budget runs out.

use std::time::Duration;

use entity::bots;
use entity::webhook_delivery_attempts;
use entity::webhook_delivery_status::WebhookDeliveryStatus;
use entity::webhook_subscriptions;
use entity::webhook_trigger::WebhookTrigger;
use entity::Id;
use hmac::{Hmac, Mac};
use log::*;
use sea_orm::{ConnectionTrait, DatabaseConnection};
use service::config::Config;
use sha2::Sha256;
use uuid::Uuid;

use crate::encryption::CredentialCipher;
use crate::error::{DomainErrorKind, EngineErrorKind, Error, InternalErrorKind};
use crate::object_id;
use entity_api::{
    webhook_delivery_attempt as attempt_api, webhook_secret as secret_api,
    webhook_subscription as subscription_api,
};

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the payload signature.
pub const SIGNATURE_HEADER: &str = "X-Webhook-Signature";
/// Header carrying the attempt's idempotency key.
pub const IDEMPOTENCY_HEADER: &str = "X-Idempotency-Key";

const WEBHOOK_SECRET_LENGTH: usize = 32;
const PENDING_BATCH_SIZE: u64 = 100;

/// Enqueues one delivery attempt per matching subscription: active, listening
/// to this trigger, and either project-wide or scoped to this bot.
pub async fn trigger<C>(
    db: &C,
    webhook_trigger: WebhookTrigger,
    bot: &bots::Model,
    payload: serde_json::Value,
) -> Result<(), Error>
where
    C: ConnectionTrait,
{
    let subscriptions = subscription_api::find_active_for_project(db, bot.project_id).await?;

    for subscription in subscriptions {
        if !subscription.has_trigger(webhook_trigger.as_i32()) {
            continue;
        }
        if subscription
            .bot_id
            .is_some_and(|scoped_bot_id| scoped_bot_id != bot.id)
        {
            continue;
        }

        attempt_api::create(
            db,
            webhook_delivery_attempts::Model {
                id: Id::new_v4(),
                webhook_subscription_id: subscription.id,
                webhook_trigger,
                idempotency_key: Uuid::new_v4(),
                bot_id: Some(bot.id),
                payload: payload.clone(),
                status: WebhookDeliveryStatus::Pending,
                attempt_count: 0,
                last_attempt_at: None,
                succeeded_at: None,
                response_body_list: serde_json::json!([]),
                created_at: chrono::Utc::now().into(),
                updated_at: chrono::Utc::now().into(),
            },
        )
        .await?;
    }

    Ok(())
}

/// Creates a subscription for a project (optionally scoped to one bot),
/// making sure the project has a signing secret first.
pub async fn create_subscription<C>(
    db: &C,
    config: &Config,
    project_id: Id,
    bot_id: Option<Id>,
    url: String,
    triggers: &[WebhookTrigger],
) -> Result<webhook_subscriptions::Model, Error>
where
    C: ConnectionTrait,
{
    get_or_create_secret(db, config, project_id).await?;

    let trigger_codes: Vec<i32> = triggers.iter().map(|trigger| trigger.as_i32()).collect();
    let now = chrono::Utc::now();

    let subscription = subscription_api::create(
        db,
        webhook_subscriptions::Model {
            id: Id::new_v4(),
            object_id: object_id::generate(entity::webhook_subscriptions::OBJECT_ID_PREFIX),
            project_id,
            bot_id,
            url,
            triggers: serde_json::json!(trigger_codes),
            is_active: true,
            created_at: now.into(),
            updated_at: now.into(),
        },
    )
    .await?;

    Ok(subscription)
}

/// The project's webhook signing secret, generating and storing a fresh
/// 32-byte secret if none exists yet.
pub async fn get_or_create_secret<C>(
    db: &C,
    config: &Config,
    project_id: Id,
) -> Result<Vec<u8>, Error>
where
    C: ConnectionTrait,
{
    let cipher = cipher_from_config(config)?;

    if let Some(secret_row) = secret_api::find_latest_for_project(db, project_id).await? {
        return Ok(cipher.decrypt_bytes(&secret_row.encrypted_secret)?);
    }

    let secret: [u8; WEBHOOK_SECRET_LENGTH] = rand::random();
    let now = chrono::Utc::now();
    secret_api::create(
        db,
        entity::webhook_secrets::Model {
            id: Id::new_v4(),
            project_id,
            encrypted_secret: cipher.encrypt_bytes(&secret)?,
            created_at: now.into(),
            updated_at: now.into(),
        },
    )
    .await?;

    Ok(secret.to_vec())
}

/// Serializes a payload into the exact bytes that get signed and POSTed.
/// serde_json keeps object keys sorted, so this is canonical.
pub fn canonical_payload(payload: &serde_json::Value) -> Result<String, Error> {
    serde_json::to_string(payload).map_err(|err| Error {
        source: Some(Box::new(err)),
        error_kind: DomainErrorKind::Internal(InternalErrorKind::Other(
            "Failed to serialize webhook payload".to_string(),
        )),
    })
}

/// HMAC-SHA-256 signature of the canonical payload, hex encoded.
pub fn sign_payload(secret: &[u8], canonical_payload: &str) -> Result<String, Error> {
    let mut mac = HmacSha256::new_from_slice(secret).map_err(|_| {
        Error::engine(EngineErrorKind::InvariantViolation(
            "Invalid webhook signing key".to_string(),
        ))
    })?;
    mac.update(canonical_payload.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Delay before the next delivery round: `base * 2^(attempts - 1)`.
pub fn next_retry_delay(config: &Config, attempt_count: i32) -> Duration {
    let exponent = attempt_count.saturating_sub(1).max(0) as u32;
    let factor = 2u64.saturating_pow(exponent);
    Duration::from_secs(config.webhook_retry_base_delay_secs.saturating_mul(factor))
}

/// Whether a pending attempt's backoff window has elapsed.
pub fn is_due(
    config: &Config,
    attempt: &webhook_delivery_attempts::Model,
    now: chrono::DateTime<chrono::Utc>,
) -> bool {
    match attempt.last_attempt_at {
        None => true,
        Some(last_attempt_at) => {
            let delay = next_retry_delay(config, attempt.attempt_count);
            let due_at = last_attempt_at.with_timezone(&chrono::Utc)
                + chrono::Duration::from_std(delay).unwrap_or_else(|_| chrono::Duration::zero());
            now >= due_at
        }
    }
}

/// Performs one delivery round for a pending attempt and persists the outcome.
pub async fn deliver_attempt(
    db: &DatabaseConnection,
    config: &Config,
    client: &reqwest::Client,
    mut attempt: webhook_delivery_attempts::Model,
) -> Result<webhook_delivery_attempts::Model, Error> {
    let subscription = subscription_api::find_by_id(db, attempt.webhook_subscription_id).await?;
    let secret = get_or_create_secret(db, config, subscription.project_id).await?;

    let body = canonical_payload(&attempt.payload)?;
    let signature = sign_payload(&secret, &body)?;

    let now = chrono::Utc::now();
    attempt.attempt_count += 1;
    attempt.last_attempt_at = Some(now.into());

    let response = client
        .post(&subscription.url)
        .header(reqwest::header::CONTENT_TYPE, "application/json")
        .header(SIGNATURE_HEADER, signature)
        .header(IDEMPOTENCY_HEADER, attempt.idempotency_key.to_string())
        .body(body)
        .send()
        .await;

    match response {
        Ok(response) if response.status().is_success() => {
            debug!(
                "Webhook delivery {} to {} succeeded on attempt {}",
                attempt.idempotency_key, subscription.url, attempt.attempt_count
            );
            attempt.status = WebhookDeliveryStatus::Success;
            attempt.succeeded_at = Some(now.into());
            let response_body = response.text().await.unwrap_or_default();
            append_response_body(&mut attempt, response_body);
        }
        Ok(response) => {
            let status = response.status();
            let response_body = response.text().await.unwrap_or_default();
            warn!(
                "Webhook delivery {} to {} returned {} on attempt {}",
                attempt.idempotency_key, subscription.url, status, attempt.attempt_count
            );
            append_response_body(&mut attempt, format!("{status}: {response_body}"));
            if attempt.attempt_count >= config.webhook_max_attempts {
                attempt.status = WebhookDeliveryStatus::Failure;
            }
        }
        Err(err) => {
            warn!(
                "Webhook delivery {} to {} errored on attempt {}: {err}",
                attempt.idempotency_key, subscription.url, attempt.attempt_count
            );
            append_response_body(&mut attempt, err.to_string());
            if attempt.attempt_count >= config.webhook_max_attempts {
                attempt.status = WebhookDeliveryStatus::Failure;
            }
        }
    }

    Ok(attempt_api::update_after_attempt(db, attempt).await?)
}

/// One pass of the delivery worker: deliver every due pending attempt.
/// Returns how many attempts were processed.
pub async fn deliver_due_attempts(
    db: &DatabaseConnection,
    config: &Config,
    client: &reqwest::Client,
) -> Result<usize, Error> {
    let pending = attempt_api::find_pending(db, PENDING_BATCH_SIZE).await?;
    let now = chrono::Utc::now();

    let mut processed = 0;
    for attempt in pending {
        if !is_due(config, &attempt, now) {
            continue;
        }
        // A failed round is already persisted on the attempt; only infrastructure
        // errors (db, missing subscription) bubble out of deliver_attempt.
        deliver_attempt(db, config, client, attempt).await?;
        processed += 1;
    }

    Ok(processed)
}

/// Builds the HTTP client used for webhook POSTs, with the configured
/// per-request timeout.
pub fn build_delivery_client(config: &Config) -> Result<reqwest::Client, Error> {
    Ok(reqwest::Client::builder()
        .timeout(Duration::from_secs(config.webhook_request_timeout_secs))
        .build()?)
}

/// Runs the delivery worker until the process exits.
pub async fn run_delivery_worker(db: &DatabaseConnection, config: &Config) -> Result<(), Error> {
    let client = build_delivery_client(config)?;
    let poll_interval = Duration::from_secs(config.webhook_poll_interval_secs);

    info!(
        "Webhook delivery worker started (poll every {}s, timeout {}s, max {} attempts)",
        config.webhook_poll_interval_secs,
        config.webhook_request_timeout_secs,
        config.webhook_max_attempts
    );

    loop {
        match deliver_due_attempts(db, config, &client).await {
            Ok(0) => {}
            Ok(processed) => debug!("Delivered {processed} webhook attempt(s)"),
            Err(err) => error!("Webhook delivery pass failed: {err}"),
        }
        tokio::time::sleep(poll_interval).await;
    }
}

fn append_response_body(attempt: &mut webhook_delivery_attempts::Model, response_body: String) {
    match attempt.response_body_list.as_array_mut() {
        Some(list) => list.push(serde_json::Value::String(response_body)),
        None => {
            attempt.response_body_list = serde_json::json!([response_body]);
        }
    }
}

fn cipher_from_config(config: &Config) -> Result<CredentialCipher, Error> {
    let key_hex = config.credentials_encryption_key().ok_or_else(|| {
        Error::config("CREDENTIALS_ENCRYPTION_KEY is required for webhook signing".to_string())
    })?;
    Ok(CredentialCipher::from_hex(&key_hex)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn test_config() -> Config {
        Config::parse_from(["meetbot_platform"])
    }

    #[test]
    fn backoff_doubles_from_the_base_delay() {
        let config = test_config();
        let base = config.webhook_retry_base_delay_secs;

        assert_eq!(next_retry_delay(&config, 1).as_secs(), base);
        assert_eq!(next_retry_delay(&config, 2).as_secs(), base * 2);
        assert_eq!(next_retry_delay(&config, 3).as_secs(), base * 4);
        assert_eq!(next_retry_delay(&config, 4).as_secs(), base * 8);
        // Attempt zero (never tried) behaves like the first attempt.
        assert_eq!(next_retry_delay(&config, 0).as_secs(), base);
    }

    #[test]
    fn attempts_without_a_prior_round_are_due_immediately() {
        let config = test_config();
        let now = chrono::Utc::now();
        let attempt = webhook_delivery_attempts::Model {
            id: Id::new_v4(),
            webhook_subscription_id: Id::new_v4(),
            webhook_trigger: WebhookTrigger::BotStateChange,
            idempotency_key: Uuid::new_v4(),
            bot_id: None,
            payload: serde_json::json!({}),
            status: WebhookDeliveryStatus::Pending,
            attempt_count: 0,
            last_attempt_at: None,
            succeeded_at: None,
            response_body_list: serde_json::json!([]),
            created_at: now.into(),
            updated_at: now.into(),
        };

        assert!(is_due(&config, &attempt, now));

        let mut retried = attempt;
        retried.attempt_count = 1;
        retried.last_attempt_at = Some(now.into());
        assert!(!is_due(&config, &retried, now));
        assert!(is_due(
            &config,
            &retried,
            now + chrono::Duration::seconds(config.webhook_retry_base_delay_secs as i64)
        ));
    }

    #[test]
    fn canonical_payload_sorts_object_keys() {
        let payload = serde_json::json!({
            "new_state": "joining",
            "event_type": "join_requested",
            "created_at": "2026-01-01T00:00:00+00:00"
        });
        let canonical = canonical_payload(&payload).unwrap();
        // serde_json's Map is a BTreeMap, so keys come out sorted regardless
        // of insertion order.
        assert_eq!(
            canonical,
            r#"{"created_at":"2026-01-01T00:00:00+00:00","event_type":"join_requested","new_state":"joining"}"#
        );
    }

    #[test]
    fn signature_is_hex_hmac_sha256() {
        let secret = b"test_secret";
        let body = r#"{"event_type":"join_requested"}"#;

        let signature = sign_payload(secret, body).unwrap();

        let mut mac = HmacSha256::new_from_slice(secret).unwrap();
        mac.update(body.as_bytes());
        let expected = hex::encode(mac.finalize().into_bytes());

        assert_eq!(signature, expected);
        assert_eq!(signature.len(), 64);
    }

    #[tokio::test]
    async fn successful_delivery_marks_the_attempt_success() {
        use crate::encryption::CredentialCipher;
        use sea_orm::{DatabaseBackend, MockDatabase};

        const TEST_KEY: &str =
            "0123456789abcdef0123456789abcdef0123456789abcdef0123456789abcdef";

        let mut server = mockito::Server::new_async().await;
        let endpoint = server
            .mock("POST", "/hooks")
            .match_header(
                "x-webhook-signature",
                mockito::Matcher::Regex("^[0-9a-f]{64}$".to_string()),
            )
            .match_header("x-idempotency-key", mockito::Matcher::Any)
            .with_status(200)
            .with_body("ok")
            .create_async()
            .await;

        let config = Config::parse_from(["meetbot_platform"])
            .set_credentials_encryption_key(TEST_KEY.to_string());
        let cipher = CredentialCipher::from_hex(TEST_KEY).unwrap();

        let now = chrono::Utc::now();
        let project_id = Id::new_v4();
        let subscription = webhook_subscriptions::Model {
            id: Id::new_v4(),
            object_id: "webhook_0123456789abcdef".to_owned(),
            project_id,
            bot_id: None,
            url: format!("{}/hooks", server.url()),
            triggers: serde_json::json!([1]),
            is_active: true,
            created_at: now.into(),
            updated_at: now.into(),
        };
        let secret_row = entity::webhook_secrets::Model {
            id: Id::new_v4(),
            project_id,
            encrypted_secret: cipher.encrypt_bytes(&[7u8; 32]).unwrap(),
            created_at: now.into(),
            updated_at: now.into(),
        };
        let attempt = webhook_delivery_attempts::Model {
            id: Id::new_v4(),
            webhook_subscription_id: subscription.id,
            webhook_trigger: WebhookTrigger::BotStateChange,
            idempotency_key: Uuid::new_v4(),
            bot_id: None,
            payload: serde_json::json!({"event_type": "join_requested"}),
            status: WebhookDeliveryStatus::Pending,
            attempt_count: 0,
            last_attempt_at: None,
            succeeded_at: None,
            response_body_list: serde_json::json!([]),
            created_at: now.into(),
            updated_at: now.into(),
        };

        // The row update_after_attempt returns from the database.
        let mut persisted = attempt.clone();
        persisted.status = WebhookDeliveryStatus::Success;
        persisted.attempt_count = 1;
        persisted.last_attempt_at = Some(now.into());
        persisted.succeeded_at = Some(now.into());
        persisted.response_body_list = serde_json::json!(["ok"]);

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![subscription]])
            .append_query_results([vec![secret_row]])
            .append_query_results([vec![persisted]])
            .into_connection();

        let client = build_delivery_client(&config).unwrap();
        let delivered = deliver_attempt(&db, &config, &client, attempt)
            .await
            .unwrap();

        assert_eq!(delivered.status, WebhookDeliveryStatus::Success);
        assert_eq!(delivered.attempt_count, 1);
        endpoint.assert_async().await;
    }

    #[test]
    fn append_response_body_keeps_order() {
        let now = chrono::Utc::now();
        let mut attempt = webhook_delivery_attempts::Model {
            id: Id::new_v4(),
            webhook_subscription_id: Id::new_v4(),
            webhook_trigger: WebhookTrigger::BotStateChange,
            idempotency_key: Uuid::new_v4(),
            bot_id: None,
            payload: serde_json::json!({}),
            status: WebhookDeliveryStatus::Pending,
            attempt_count: 0,
            last_attempt_at: None,
            succeeded_at: None,
            response_body_list: serde_json::json!([]),
            created_at: now.into(),
            updated_at: now.into(),
        };

        append_response_body(&mut attempt, "500: oops".to_string());
        append_response_body(&mut attempt, "ok".to_string());

        assert_eq!(
            attempt.response_body_list,
            serde_json::json!(["500: oops", "ok"])
        );
    }
}

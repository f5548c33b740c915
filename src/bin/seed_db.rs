//! Seeds a development database with a demo organization, project, webhook
//! subscription and a ready bot.

use entity::credential_kind::CredentialKind;
use entity::session_kind::SessionKind;
use entity::webhook_trigger::WebhookTrigger;
use entity::Id;
use log::info;
use service::{config::Config, logging::Logger, AppState};
use std::sync::Arc;

#[tokio::main]
async fn main() {
    let config = Config::new();
    Logger::init_logger(&config);

    info!("Seeding database [{}]...", config.database_url());

    let db = Arc::new(
        service::init_database(&config)
            .await
            .expect("Failed to connect to the database"),
    );

    let app_state = AppState::new(config, &db);
    let db = app_state.db_conn_ref();
    let config = &app_state.config;
    let now = chrono::Utc::now();

    let organization = entity_api::organization::create(
        db,
        entity::organizations::Model {
            id: Id::new_v4(),
            name: "Demo Organization".to_owned(),
            centicredits: 0,
            created_at: now.into(),
            updated_at: now.into(),
        },
    )
    .await
    .expect("Failed to create organization");

    // Give the demo organization a starting balance of 50 credits.
    domain::credit::create_transaction(
        db,
        organization.id,
        5_000,
        None,
        None,
        Some("Initial demo balance".to_owned()),
    )
    .await
    .expect("Failed to create initial credit transaction");

    let project = entity_api::project::create(
        db,
        entity::projects::Model {
            id: Id::new_v4(),
            object_id: domain::object_id::generate(entity::projects::OBJECT_ID_PREFIX),
            organization_id: organization.id,
            name: "Demo Project".to_owned(),
            created_at: now.into(),
            updated_at: now.into(),
        },
    )
    .await
    .expect("Failed to create project");

    domain::webhook::create_subscription(
        db,
        config,
        project.id,
        None,
        "https://example.com/webhooks/meetbot".to_owned(),
        &[
            WebhookTrigger::BotStateChange,
            WebhookTrigger::AsyncTranscriptionStateChange,
        ],
    )
    .await
    .expect("Failed to create webhook subscription");

    domain::credentials::set_credentials(
        db,
        config,
        project.id,
        CredentialKind::Deepgram,
        &serde_json::json!({ "api_key": "dg_demo_key" }),
    )
    .await
    .expect("Failed to store demo credentials");

    let bot = domain::bot::create_bot(
        db,
        &project,
        domain::bot::NewBotParams {
            name: "Demo bot".to_owned(),
            meeting_url: "https://meet.google.com/abc-defg-hij".to_owned(),
            join_at: None,
            deduplication_key: None,
            session_kind: SessionKind::Bot,
            settings: serde_json::json!({
                "recording_settings": { "format": "mp4" },
                "transcription_settings": { "deepgram": { "language": "en" } }
            }),
            metadata: None,
        },
    )
    .await
    .expect("Failed to create bot");

    info!(
        "Seeded organization '{}' with project {} and bot {}",
        organization.name, project.object_id, bot.object_id
    );
}

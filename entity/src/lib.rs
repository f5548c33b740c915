use uuid::Uuid;

// Core entities
pub mod bot_events;
pub mod bots;
pub mod credit_transactions;
pub mod organizations;
pub mod projects;
pub mod recordings;

// Meeting artifact entities
pub mod async_transcriptions;
pub mod bot_debug_screenshots;
pub mod bot_resource_snapshots;
pub mod chat_messages;
pub mod participants;
pub mod utterances;

// Webhook and credential entities
pub mod credentials;
pub mod webhook_delivery_attempts;
pub mod webhook_secrets;
pub mod webhook_subscriptions;

// Taxonomies
pub mod async_transcription_state;
pub mod bot_event_kind;
pub mod bot_event_subkind;
pub mod bot_state;
pub mod credential_kind;
pub mod recording_kind;
pub mod recording_state;
pub mod recording_transcription_state;
pub mod session_kind;
pub mod transcription_kind;
pub mod transcription_provider;
pub mod webhook_delivery_status;
pub mod webhook_trigger;

/// A type alias that represents any Entity's internal id field data type.
/// Aliased so that it's easy to change the underlying type if necessary.
pub type Id = Uuid;

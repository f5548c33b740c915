//! Post-meeting transcription runs.
//!
//! The state machine has the same shape as the recording sub-engine:
//! NOT_STARTED -> IN_PROGRESS -> COMPLETE | FAILED, idempotent setters,
//! versioned writes. Every transition emits an
//! `async_transcription.state_change` webhook.

use entity::async_transcription_state::AsyncTranscriptionState;
use entity::async_transcriptions;
use entity::webhook_trigger::WebhookTrigger;
use log::*;
use sea_orm::ConnectionTrait;
use serde_json::json;

use crate::error::{EngineErrorKind, Error};
use crate::webhook;
use entity_api::{
    async_transcription as async_transcription_api, bot as bot_api, recording as recording_api,
};

pub async fn set_in_progress<C>(
    db: &C,
    async_transcription: &async_transcriptions::Model,
) -> Result<(), Error>
where
    C: ConnectionTrait,
{
    let mut async_transcription =
        async_transcription_api::find_by_id(db, async_transcription.id).await?;

    if async_transcription.state == AsyncTranscriptionState::InProgress {
        return Ok(());
    }
    if async_transcription.state != AsyncTranscriptionState::NotStarted {
        return Err(invalid_transition(&async_transcription));
    }

    async_transcription.state = AsyncTranscriptionState::InProgress;
    async_transcription.started_at = Some(chrono::Utc::now().into());
    async_transcription_api::update_with_version(db, &async_transcription).await?;

    deliver_webhook(db, &async_transcription).await
}

pub async fn set_complete<C>(
    db: &C,
    async_transcription: &async_transcriptions::Model,
) -> Result<(), Error>
where
    C: ConnectionTrait,
{
    let mut async_transcription =
        async_transcription_api::find_by_id(db, async_transcription.id).await?;

    if async_transcription.state == AsyncTranscriptionState::Complete {
        return Ok(());
    }
    if async_transcription.state != AsyncTranscriptionState::InProgress {
        return Err(invalid_transition(&async_transcription));
    }

    async_transcription.state = AsyncTranscriptionState::Complete;
    async_transcription.completed_at = Some(chrono::Utc::now().into());
    async_transcription_api::update_with_version(db, &async_transcription).await?;

    deliver_webhook(db, &async_transcription).await
}

pub async fn set_failed<C>(
    db: &C,
    async_transcription: &async_transcriptions::Model,
    failure_data: serde_json::Value,
) -> Result<(), Error>
where
    C: ConnectionTrait,
{
    let mut async_transcription =
        async_transcription_api::find_by_id(db, async_transcription.id).await?;

    if async_transcription.state == AsyncTranscriptionState::Failed {
        return Ok(());
    }
    // Failure is reachable from NOT_STARTED too: a run can die before it starts.
    if !matches!(
        async_transcription.state,
        AsyncTranscriptionState::InProgress | AsyncTranscriptionState::NotStarted
    ) {
        return Err(invalid_transition(&async_transcription));
    }

    warn!(
        "Async transcription {} failed: {failure_data}",
        async_transcription.object_id
    );

    async_transcription.state = AsyncTranscriptionState::Failed;
    async_transcription.failure_data = Some(failure_data);
    async_transcription.failed_at = Some(chrono::Utc::now().into());
    async_transcription_api::update_with_version(db, &async_transcription).await?;

    deliver_webhook(db, &async_transcription).await
}

/// Enqueues the state-change webhook for the transcription's bot.
async fn deliver_webhook<C>(
    db: &C,
    async_transcription: &async_transcriptions::Model,
) -> Result<(), Error>
where
    C: ConnectionTrait,
{
    let recording = recording_api::find_by_id(db, async_transcription.recording_id).await?;
    let bot = bot_api::find_by_id(db, recording.bot_id).await?;

    webhook::trigger(
        db,
        WebhookTrigger::AsyncTranscriptionStateChange,
        &bot,
        json!({
            "id": async_transcription.object_id,
            "state": async_transcription.state.api_code(),
            "failure_data": async_transcription.failure_data,
        }),
    )
    .await
}

fn invalid_transition(async_transcription: &async_transcriptions::Model) -> Error {
    Error::engine(EngineErrorKind::InvariantViolation(format!(
        "Invalid state transition. Async transcription {} is in state {}",
        async_transcription.object_id, async_transcription.state
    )))
}

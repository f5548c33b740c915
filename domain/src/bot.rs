//! Bot lifecycle engine.
//!
//! `apply_event` is the single write path for bot state: it validates the
//! event against the transition table, moves the state under optimistic
//! concurrency, runs the coupled side effects (recordings, credits, duration
//! accounting), appends the immutable event record and fans the change out to
//! webhooks, all in one database transaction. Concurrent writers are resolved
//! by the version column: exactly one transition wins, the others retry and
//! re-validate against the state the winner left behind.

use entity::bot_event_kind::BotEventKind;
use entity::bot_event_subkind::{combination_is_valid, BotEventSubKind};
use entity::bot_events;
use entity::bot_state::BotState;
use entity::bots;
use entity::projects;
use entity::recording_kind::RecordingKind;
use entity::recording_state::RecordingState;
use entity::recording_transcription_state::RecordingTranscriptionState;
use entity::recordings;
use entity::session_kind::SessionKind;
use entity::transcription_kind::TranscriptionKind;
use entity::webhook_trigger::WebhookTrigger;
use entity::Id;
use log::*;
use sea_orm::{ConnectionTrait, DatabaseConnection, TransactionTrait};
use serde_json::{json, Map, Value};
use service::config::Config;

use crate::alert::{self, OperatorAlert};
use crate::error::{EngineErrorKind, Error};
use crate::object_id;
use crate::recording as recording_manager;
use crate::transition::{
    self, event_can_be_created_for_state, resolve_from_last_event, TransitionTarget,
};
use crate::transcription_settings::TranscriptionSettings;
use crate::{credit, webhook};
use entity_api::{
    bot as bot_api, bot_event as bot_event_api, chat_message as chat_message_api,
    debug_screenshot as debug_screenshot_api, participant as participant_api,
    project as project_api, recording as recording_api, resource_snapshot as resource_snapshot_api,
    utterance as utterance_api, webhook_delivery_attempt as attempt_api,
};

/// Retries for an event application losing optimistic-concurrency races.
const MAX_EVENT_RETRIES: usize = 3;
/// Retries for the heartbeat write, which contends with every other writer.
const MAX_HEARTBEAT_RETRIES: usize = 10;

/// Applies an event to a bot, returning the appended event record.
///
/// Retryable failures are optimistic version conflicts only; after
/// `MAX_EVENT_RETRIES` the conflict is surfaced. All other failures abort
/// immediately.
pub async fn apply_event(
    db: &DatabaseConnection,
    config: &Config,
    bot_id: Id,
    event_kind: BotEventKind,
    event_subkind: Option<BotEventSubKind>,
    event_metadata: Option<Value>,
) -> Result<bot_events::Model, Error> {
    validate_combination(event_kind, event_subkind)?;
    let metadata = normalize_metadata(event_metadata)?;

    let mut retry_count = 0;
    loop {
        let txn = db.begin().await.map_err(Error::from)?;

        match apply_event_in_txn(&txn, config, bot_id, event_kind, event_subkind, metadata.clone())
            .await
        {
            Ok((event, operator_alert)) => {
                txn.commit().await.map_err(Error::from)?;
                // The alert leaves the process after the transaction commits;
                // an HTTP call must not hold row locks.
                if let Some(operator_alert) = operator_alert {
                    alert::send_operator_alert(config, &operator_alert).await;
                }
                return Ok(event);
            }
            Err(err) if err.is_optimistic_conflict() => {
                let _ = txn.rollback().await;
                retry_count += 1;
                if retry_count >= MAX_EVENT_RETRIES {
                    warn!(
                        "Event {event_kind} for bot {bot_id} still conflicting after \
                         {MAX_EVENT_RETRIES} attempts"
                    );
                    return Err(err);
                }
                debug!(
                    "Event {event_kind} for bot {bot_id} lost a concurrency race, \
                     retrying ({retry_count}/{MAX_EVENT_RETRIES})"
                );
                continue;
            }
            Err(err) => {
                let _ = txn.rollback().await;
                return Err(err);
            }
        }
    }
}

/// One attempt at applying an event, inside the given transaction.
/// Returns the event plus an operator alert to be sent after commit.
async fn apply_event_in_txn<C>(
    txn: &C,
    config: &Config,
    bot_id: Id,
    event_kind: BotEventKind,
    event_subkind: Option<BotEventSubKind>,
    mut metadata: Map<String, Value>,
) -> Result<(bot_events::Model, Option<OperatorAlert>), Error>
where
    C: ConnectionTrait + TransactionTrait,
{
    // Fresh bot state; this read anchors the version the write below swaps on.
    let bot = bot_api::find_by_id(txn, bot_id).await?;
    let old_state = bot.state;

    let transition = transition::transition_for(event_kind).ok_or_else(|| {
        Error::engine(EngineErrorKind::UndefinedEventKind(format!(
            "No valid transitions defined for event kind {event_kind}"
        )))
    })?;

    if !transition.valid_from.contains(&old_state) {
        let valid_states: Vec<&str> = transition
            .valid_from
            .iter()
            .map(|state| state.api_code())
            .collect();
        return Err(Error::engine(EngineErrorKind::IllegalTransition(format!(
            "Event {} not allowed when bot is in state {}. It is only allowed in these states: {}",
            event_kind.api_code(),
            old_state.api_code(),
            valid_states.join(", ")
        ))));
    }

    let new_state = match transition.to {
        TransitionTarget::Constant(state) => state,
        TransitionTarget::FromLastEvent => {
            let last_event = bot_event_api::find_last_for_bot(txn, bot.id).await?;
            resolve_from_last_event(last_event.as_ref())?
        }
    };

    bot_api::update_state(txn, &bot, new_state).await?;

    // Re-read what we just wrote. Another worker in the same process slipping
    // a different state in here indicates corruption, not ordinary contention.
    let bot = bot_api::find_by_id(txn, bot_id).await?;
    if bot.state != new_state {
        return Err(Error::engine(EngineErrorKind::ConcurrentStateOverwrite(
            format!(
                "Bot state was modified by another worker to be '{}' instead of '{}'",
                bot.state.api_code(),
                new_state.api_code()
            ),
        )));
    }

    // Entering hooks, in order.
    if new_state == BotState::Staged {
        check_staged_metadata(&bot, &metadata)?;
    }

    if new_state == BotState::JoinedRecording || new_state == BotState::Connected {
        recording_manager::start_pending_recording(txn, &bot, event_kind).await?;
    }

    if new_state == BotState::JoinedRecordingPaused {
        recording_manager::pause_in_progress_recording(txn, &bot).await?;
    }

    if new_state == BotState::JoinedRecordingPermissionDenied {
        recording_manager::pause_in_progress_recording_if_any(txn, &bot).await?;
    }

    let mut operator_alert = None;
    if new_state == BotState::FatalError && event_kind == BotEventKind::FatalError {
        operator_alert = Some(compose_fatal_error_alert(txn, &bot, event_subkind).await?);
    }

    // Crossing into post-meeting terminates recordings and settles credits.
    if new_state.is_post_meeting() && !old_state.is_post_meeting() {
        handle_post_meeting_transition(txn, config, &bot, event_kind, &mut metadata).await?;
    }

    let event = bot_event_api::create(
        txn,
        bot.id,
        old_state,
        bot.state,
        event_kind,
        event_subkind,
        Value::Object(metadata.clone()),
    )
    .await?;

    webhook::trigger(
        txn,
        WebhookTrigger::BotStateChange,
        &bot,
        json!({
            "event_type": event_kind.api_code(),
            "event_sub_type": event_subkind.map(|subkind| subkind.api_code()),
            "event_metadata": Value::Object(metadata),
            "old_state": old_state.api_code(),
            "new_state": bot.state.api_code(),
            "created_at": event.created_at.to_rfc3339(),
        }),
    )
    .await?;

    Ok((event, operator_alert))
}

/// STAGED requires the caller to echo the bot's scheduled join time, proving
/// it staged the bot it believes it did.
fn check_staged_metadata(bot: &bots::Model, metadata: &Map<String, Value>) -> Result<(), Error> {
    let Some(join_at) = metadata.get("join_at").and_then(|value| value.as_str()) else {
        return Err(Error::engine(EngineErrorKind::InvariantViolation(format!(
            "join_at is required in event metadata for bot {} for transition to state {}",
            bot.object_id,
            BotState::Staged.api_code()
        ))));
    };

    let expected = bot
        .join_at
        .map(|bot_join_at| bot_join_at.to_rfc3339())
        .unwrap_or_default();

    if join_at != expected {
        return Err(Error::engine(EngineErrorKind::InvariantViolation(format!(
            "join_at in event metadata for bot {} does not match the bot's scheduled join time",
            bot.object_id
        ))));
    }
    Ok(())
}

/// Recording termination, duration accounting and the credit debit for a bot
/// leaving the meeting. `FATAL_ERROR` transitions never incur charges.
async fn handle_post_meeting_transition<C>(
    txn: &C,
    config: &Config,
    bot: &bots::Model,
    event_kind: BotEventKind,
    metadata: &mut Map<String, Value>,
) -> Result<(), Error>
where
    C: ConnectionTrait + TransactionTrait,
{
    metadata.insert(
        "bot_duration_seconds".to_string(),
        json!(bot.duration_seconds()),
    );

    let active_recordings =
        recording_api::find_by_bot_in_states(txn, bot.id, recording_manager::ACTIVE_STATES).await?;
    if active_recordings.len() > 1 {
        return Err(Error::engine(EngineErrorKind::InvariantViolation(format!(
            "Expected at most one in progress recording for bot {} in state {}, but found {}",
            bot.object_id,
            bot.state,
            active_recordings.len()
        ))));
    }
    for recording in &active_recordings {
        recording_manager::terminate_recording(txn, recording).await?;
    }

    // Surface the distinct transcription failure reasons on the event itself.
    let mut transcription_errors: Vec<Value> = Vec::new();
    for failed in recording_api::find_with_failed_transcription(txn, bot.id).await? {
        if let Some(reasons) = failed
            .transcription_failure_data
            .as_ref()
            .and_then(|data| data.get("failure_reasons"))
            .and_then(|reasons| reasons.as_array())
        {
            transcription_errors.extend(reasons.iter().cloned());
        }
    }
    if !transcription_errors.is_empty() {
        metadata.insert(
            "transcription_errors".to_string(),
            Value::Array(transcription_errors),
        );
    }

    let should_incur_charges = event_kind != BotEventKind::FatalError;
    if config.charge_credits_for_bots && should_incur_charges {
        let centicredits_consumed = bot.centicredits_consumed();
        if centicredits_consumed > 0 {
            let project = project_api::find_by_id(txn, bot.project_id).await?;
            credit::create_transaction(
                txn,
                project.organization_id,
                -centicredits_consumed,
                Some(bot.id),
                None,
                Some(format!("For bot {}", bot.object_id)),
            )
            .await?;
            metadata.insert(
                "credits_consumed".to_string(),
                json!(centicredits_consumed as f64 / 100.0),
            );
        }
    }

    Ok(())
}

/// Formats the operator alert for a fatal error: bot identity, cause, and the
/// latest resource snapshot if one was captured.
async fn compose_fatal_error_alert<C>(
    txn: &C,
    bot: &bots::Model,
    event_subkind: Option<BotEventSubKind>,
) -> Result<OperatorAlert, Error>
where
    C: ConnectionTrait,
{
    let snapshot = resource_snapshot_api::find_latest_for_bot(txn, bot.id).await?;
    let snapshot_data = snapshot
        .map(|snapshot| snapshot.data.to_string())
        .unwrap_or_else(|| "None found.".to_string());
    let subkind_code = event_subkind
        .map(|subkind| subkind.api_code())
        .unwrap_or("none");

    Ok(OperatorAlert::new(format!(
        "Bot {} encountered a fatal error. Event sub type: {subkind_code}. \
         Last bot resource snapshot: {snapshot_data}",
        bot.object_id
    )))
}

/// Monotonic heartbeat write. Contends with every other bot writer, so it
/// retries more aggressively than the engine.
pub async fn set_heartbeat(db: &DatabaseConnection, bot_id: Id) -> Result<(), Error> {
    let mut retry_count = 0;
    loop {
        let bot = bot_api::find_by_id(db, bot_id).await?;
        let current_timestamp = chrono::Utc::now().timestamp();

        match bot_api::set_heartbeat(db, &bot, current_timestamp).await {
            Ok(()) => return Ok(()),
            Err(err)
                if err.error_kind == entity_api::error::EntityApiErrorKind::StaleVersion =>
            {
                retry_count += 1;
                if retry_count >= MAX_HEARTBEAT_RETRIES {
                    return Err(err.into());
                }
                continue;
            }
            Err(err) => return Err(err.into()),
        }
    }
}

/// Stamps the last requester event once the requested action has actually
/// been executed (the pod joined, left, connected or disconnected).
pub async fn record_request_taken(db: &DatabaseConnection, bot_id: Id) -> Result<(), Error> {
    let bot = bot_api::find_by_id(db, bot_id).await?;

    let expected_kind = match bot.state {
        BotState::Joining => BotEventKind::JoinRequested,
        BotState::Leaving => BotEventKind::LeaveRequested,
        BotState::Connecting => BotEventKind::AppSessionConnectionRequested,
        BotState::Disconnecting => BotEventKind::AppSessionDisconnectRequested,
        other => {
            return Err(Error::engine(EngineErrorKind::InvalidRequest(format!(
                "Bot {} is in state {}. This is not a valid state to initiate a bot request",
                bot.object_id,
                other.api_code()
            ))));
        }
    };

    let Some(last_event) = bot_event_api::find_last_for_bot(db, bot.id).await? else {
        return Err(Error::engine(EngineErrorKind::InvalidRequest(format!(
            "Bot {} has no events. This is not a valid state to initiate a bot request",
            bot.object_id
        ))));
    };

    if last_event.event_kind != expected_kind {
        return Err(Error::engine(EngineErrorKind::InvalidRequest(format!(
            "Bot {} has unexpected event kind {}. Expected {} since it is in state {}",
            bot.object_id,
            last_event.event_kind.api_code(),
            expected_kind.api_code(),
            bot.state.api_code()
        ))));
    }

    if last_event.requested_action_taken_at.is_some() {
        return Err(Error::engine(EngineErrorKind::InvalidRequest(format!(
            "Bot {} has already initiated this bot request",
            bot.object_id
        ))));
    }

    bot_event_api::stamp_requested_action_taken(db, last_event).await?;
    Ok(())
}

/// Destroys a bot's meeting data: screenshots, utterances, chat, participants
/// and content-bearing webhook attempts, then records the DATA_DELETED
/// transition in the same transaction. State-change webhook attempts stay for
/// audit, as does the event history itself.
pub async fn delete_data(
    db: &DatabaseConnection,
    config: &Config,
    bot_id: Id,
) -> Result<bot_events::Model, Error> {
    let mut retry_count = 0;
    loop {
        let txn = db.begin().await.map_err(Error::from)?;

        match delete_data_in_txn(&txn, config, bot_id).await {
            Ok(event) => {
                txn.commit().await.map_err(Error::from)?;
                return Ok(event);
            }
            Err(err) if err.is_optimistic_conflict() => {
                let _ = txn.rollback().await;
                retry_count += 1;
                if retry_count >= MAX_EVENT_RETRIES {
                    return Err(err);
                }
                continue;
            }
            Err(err) => {
                let _ = txn.rollback().await;
                return Err(err);
            }
        }
    }
}

async fn delete_data_in_txn<C>(
    txn: &C,
    config: &Config,
    bot_id: Id,
) -> Result<bot_events::Model, Error>
where
    C: ConnectionTrait + TransactionTrait,
{
    let bot = bot_api::find_by_id(txn, bot_id).await?;

    if !event_can_be_created_for_state(BotEventKind::DataDeleted, bot.state) {
        return Err(Error::engine(EngineErrorKind::IllegalTransition(format!(
            "Bot {} is in state {}, which does not allow data deletion",
            bot.object_id,
            bot.state.api_code()
        ))));
    }

    let events = bot_event_api::find_all_for_bot(txn, bot.id).await?;
    let event_ids: Vec<Id> = events.iter().map(|event| event.id).collect();
    debug_screenshot_api::delete_by_bot_event_ids(txn, &event_ids).await?;

    let recordings = recording_api::find_all_for_bot(txn, bot.id).await?;
    let recording_ids: Vec<Id> = recordings.iter().map(|recording| recording.id).collect();
    utterance_api::delete_by_recording_ids(txn, &recording_ids).await?;
    recording_api::clear_files_for_bot(txn, bot.id).await?;

    chat_message_api::delete_by_bot(txn, bot.id).await?;
    participant_api::delete_by_bot(txn, bot.id).await?;

    // Attempts for triggers other than bot.state_change carry meeting content.
    attempt_api::delete_sensitive_for_bot(txn, bot.id).await?;

    info!("Deleted meeting data for bot {}", bot.object_id);

    let (event, _) = apply_event_in_txn(
        txn,
        config,
        bot_id,
        BotEventKind::DataDeleted,
        None,
        Map::new(),
    )
    .await?;

    Ok(event)
}

/// Parameters for creating a bot.
#[derive(Debug, Clone, Default)]
pub struct NewBotParams {
    pub name: String,
    pub meeting_url: String,
    pub join_at: Option<chrono::DateTime<chrono::Utc>>,
    pub deduplication_key: Option<String>,
    pub session_kind: SessionKind,
    pub settings: Value,
    pub metadata: Option<Value>,
}

/// Creates a bot and its default recording. Bots with a scheduled join time
/// start in SCHEDULED, everything else in READY.
pub async fn create_bot(
    db: &DatabaseConnection,
    project: &projects::Model,
    params: NewBotParams,
) -> Result<bots::Model, Error> {
    if let Some(deduplication_key) = params.deduplication_key.as_deref() {
        let active =
            bot_api::count_active_with_deduplication_key(db, project.id, deduplication_key).await?;
        if active > 0 {
            return Err(Error::engine(EngineErrorKind::InvalidRequest(format!(
                "A bot with deduplication key '{deduplication_key}' is already active in \
                 project {}",
                project.object_id
            ))));
        }
    }

    let initial_state = if params.join_at.is_some() {
        BotState::Scheduled
    } else {
        BotState::Ready
    };

    let object_id_prefix = match params.session_kind {
        SessionKind::Bot => "bot_",
        SessionKind::AppSession => "app_",
    };

    let now = chrono::Utc::now();
    let bot = bot_api::create(
        db,
        bots::Model {
            id: Id::new_v4(),
            object_id: object_id::generate(object_id_prefix),
            project_id: project.id,
            name: params.name,
            meeting_url: params.meeting_url,
            state: initial_state,
            settings: params.settings.clone(),
            metadata: params.metadata,
            first_heartbeat_timestamp: None,
            last_heartbeat_timestamp: None,
            join_at: params.join_at.map(Into::into),
            deduplication_key: params.deduplication_key,
            session_kind: params.session_kind,
            version: 0,
            created_at: now.into(),
            updated_at: now.into(),
        },
    )
    .await?;

    let recording_kind = recording_kind_from_settings(&params.settings);
    let transcription_settings = TranscriptionSettings::from_bot_settings(&params.settings);
    let transcription_kind = if params.settings.get("transcription_settings").is_some() {
        TranscriptionKind::NonRealtime
    } else {
        TranscriptionKind::NoTranscription
    };

    recording_api::create(
        db,
        recordings::Model {
            id: Id::new_v4(),
            object_id: object_id::generate(entity::recordings::OBJECT_ID_PREFIX),
            bot_id: bot.id,
            recording_kind,
            transcription_kind,
            is_default_recording: true,
            state: RecordingState::NotStarted,
            transcription_state: RecordingTranscriptionState::NotStarted,
            transcription_failure_data: None,
            transcription_provider: transcription_settings.provider_hint(),
            file_name: None,
            started_at: None,
            completed_at: None,
            version: 0,
            created_at: now.into(),
            updated_at: now.into(),
        },
    )
    .await?;

    Ok(bot)
}

/// The recording kind is derived from the configured recording format.
fn recording_kind_from_settings(settings: &Value) -> RecordingKind {
    let format = settings
        .get("recording_settings")
        .and_then(|recording_settings| recording_settings.get("format"))
        .and_then(|format| format.as_str())
        .unwrap_or("mp4");

    match format {
        "mp3" => RecordingKind::AudioOnly,
        "none" => RecordingKind::NoRecording,
        _ => RecordingKind::AudioAndVideo,
    }
}

fn validate_combination(
    event_kind: BotEventKind,
    event_subkind: Option<BotEventSubKind>,
) -> Result<(), Error> {
    if combination_is_valid(event_kind, event_subkind) {
        return Ok(());
    }
    let subkind_code = event_subkind
        .map(|subkind| subkind.api_code())
        .unwrap_or("null");
    Err(Error::engine(EngineErrorKind::InvalidEventCombination(
        format!(
            "Event kind {} does not permit subkind {subkind_code}",
            event_kind.api_code()
        ),
    )))
}

fn normalize_metadata(event_metadata: Option<Value>) -> Result<Map<String, Value>, Error> {
    match event_metadata {
        None => Ok(Map::new()),
        Some(Value::Object(map)) => Ok(map),
        Some(other) => Err(Error::engine(EngineErrorKind::InvariantViolation(format!(
            "Event metadata must be a JSON object, got: {other}"
        )))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DomainErrorKind;

    #[test]
    fn fatal_error_without_subkind_is_rejected_at_entry() {
        let result = validate_combination(BotEventKind::FatalError, None);
        assert!(matches!(
            result,
            Err(Error {
                error_kind: DomainErrorKind::Engine(EngineErrorKind::InvalidEventCombination(_)),
                ..
            })
        ));
    }

    #[test]
    fn plain_event_with_subkind_is_rejected_at_entry() {
        let result = validate_combination(
            BotEventKind::BotJoinedMeeting,
            Some(BotEventSubKind::FatalErrorHeartbeatTimeout),
        );
        assert!(result.is_err());
    }

    #[test]
    fn metadata_must_be_an_object() {
        assert!(normalize_metadata(None).unwrap().is_empty());
        assert!(normalize_metadata(Some(json!({"k": 1}))).is_ok());
        assert!(normalize_metadata(Some(json!([1, 2]))).is_err());
        assert!(normalize_metadata(Some(json!("nope"))).is_err());
    }

    #[test]
    fn recording_kind_follows_the_configured_format() {
        assert_eq!(
            recording_kind_from_settings(&json!({})),
            RecordingKind::AudioAndVideo
        );
        assert_eq!(
            recording_kind_from_settings(&json!({"recording_settings": {"format": "webm"}})),
            RecordingKind::AudioAndVideo
        );
        assert_eq!(
            recording_kind_from_settings(&json!({"recording_settings": {"format": "mp3"}})),
            RecordingKind::AudioOnly
        );
        assert_eq!(
            recording_kind_from_settings(&json!({"recording_settings": {"format": "none"}})),
            RecordingKind::NoRecording
        );
    }
}

#[cfg(test)]
mod engine_tests {
    use super::*;
    use crate::error::DomainErrorKind;
    use clap::Parser;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn test_config() -> Config {
        Config::parse_from(["meetbot_platform"])
    }

    fn bot_in_state(state: BotState) -> bots::Model {
        let now = chrono::Utc::now();
        bots::Model {
            id: Id::new_v4(),
            object_id: "bot_0123456789abcdef".to_owned(),
            project_id: Id::new_v4(),
            name: "My bot".to_owned(),
            meeting_url: "https://meet.google.com/abc-defg-hij".to_owned(),
            state,
            settings: json!({}),
            metadata: None,
            first_heartbeat_timestamp: None,
            last_heartbeat_timestamp: None,
            join_at: None,
            deduplication_key: None,
            session_kind: SessionKind::Bot,
            version: 0,
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    #[tokio::test]
    async fn apply_event_rejects_illegal_transitions_with_api_codes() {
        // A READY bot cannot receive BOT_JOINED_MEETING; the engine reads the
        // bot, sees the state mismatch and aborts without writing.
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![bot_in_state(BotState::Ready)]])
            .into_connection();

        let result = apply_event(
            &db,
            &test_config(),
            Id::new_v4(),
            BotEventKind::BotJoinedMeeting,
            None,
            None,
        )
        .await;

        match result {
            Err(Error {
                error_kind: DomainErrorKind::Engine(EngineErrorKind::IllegalTransition(message)),
                ..
            }) => {
                assert!(message.contains("joined_meeting"));
                assert!(message.contains("ready"));
                assert!(message.contains("waiting_room"));
                assert!(message.contains("joining"));
            }
            other => panic!("expected IllegalTransition, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn apply_event_rejects_invalid_combinations_before_touching_the_database() {
        // No query results are mocked: a combination failure must never reach
        // the database.
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();

        let result = apply_event(
            &db,
            &test_config(),
            Id::new_v4(),
            BotEventKind::FatalError,
            None,
            None,
        )
        .await;

        assert!(matches!(
            result,
            Err(Error {
                error_kind: DomainErrorKind::Engine(EngineErrorKind::InvalidEventCombination(_)),
                ..
            })
        ));
    }

    #[tokio::test]
    async fn record_request_taken_rejects_non_requester_states() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![bot_in_state(BotState::Ready)]])
            .into_connection();

        let result = record_request_taken(&db, Id::new_v4()).await;

        assert!(matches!(
            result,
            Err(Error {
                error_kind: DomainErrorKind::Engine(EngineErrorKind::InvalidRequest(_)),
                ..
            })
        ));
    }
}

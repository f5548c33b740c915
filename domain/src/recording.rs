//! Recording sub-engine.
//!
//! Recordings move through NOT_STARTED -> IN_PROGRESS <-> PAUSED ->
//! COMPLETE | FAILED as a side effect of bot transitions. All writes go
//! through versioned compare-and-swap updates, so a lost race here aborts the
//! surrounding engine transaction and triggers its retry.

use entity::bot_event_kind::BotEventKind;
use entity::bots;
use entity::recording_kind::RecordingKind;
use entity::recording_state::RecordingState;
use entity::recording_transcription_state::RecordingTranscriptionState;
use entity::recordings;
use log::*;
use sea_orm::ConnectionTrait;

use crate::error::{EngineErrorKind, Error};
use entity_api::{recording as recording_api, utterance as utterance_api};

/// Failure reasons recorded in a recording's transcription failure data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranscriptionFailureReason {
    CredentialsNotFound,
    CredentialsInvalid,
    RateLimitExceeded,
    AudioUploadFailed,
    TranscriptionRequestFailed,
    TimedOut,
    InternalError,
    UtterancesStillInProgressWhenRecordingTerminated,
    UtterancesStillInProgressWhenTranscriptionTerminated,
}

impl TranscriptionFailureReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            TranscriptionFailureReason::CredentialsNotFound => "credentials_not_found",
            TranscriptionFailureReason::CredentialsInvalid => "credentials_invalid",
            TranscriptionFailureReason::RateLimitExceeded => "rate_limit_exceeded",
            TranscriptionFailureReason::AudioUploadFailed => "audio_upload_failed",
            TranscriptionFailureReason::TranscriptionRequestFailed => {
                "transcription_request_failed"
            }
            TranscriptionFailureReason::TimedOut => "timed_out",
            TranscriptionFailureReason::InternalError => "internal_error",
            TranscriptionFailureReason::UtterancesStillInProgressWhenRecordingTerminated => {
                "utterances_still_in_progress_when_recording_terminated"
            }
            TranscriptionFailureReason::UtterancesStillInProgressWhenTranscriptionTerminated => {
                "utterances_still_in_progress_when_transcription_terminated"
            }
        }
    }
}

/// States in which a recording occupies the bot's single active slot.
pub const ACTIVE_STATES: &[RecordingState] = &[RecordingState::InProgress, RecordingState::Paused];

/// States from which a recording can be started.
const STARTABLE_STATES: &[RecordingState] =
    &[RecordingState::NotStarted, RecordingState::Paused];

/// Hook for the bot entering JOINED_RECORDING (or CONNECTED for app
/// sessions): promotes the single startable recording to IN_PROGRESS.
///
/// Breakout-room re-entries are an exception: the recording kept running
/// while the bot crossed rooms, so no startable recording is expected.
pub async fn start_pending_recording<C>(
    db: &C,
    bot: &bots::Model,
    event_kind: BotEventKind,
) -> Result<(), Error>
where
    C: ConnectionTrait,
{
    let pending = recording_api::find_by_bot_in_states(db, bot.id, STARTABLE_STATES).await?;

    if pending.len() != 1 {
        if matches!(
            event_kind,
            BotEventKind::BotJoinedBreakoutRoom | BotEventKind::BotLeftBreakoutRoom
        ) {
            return Ok(());
        }
        return Err(Error::engine(EngineErrorKind::InvariantViolation(format!(
            "Expected exactly one pending recording for bot {} in state {}, but found {}",
            bot.object_id,
            bot.state,
            pending.len()
        ))));
    }

    set_recording_in_progress(db, &pending[0]).await
}

/// Hook for JOINED_RECORDING_PAUSED: demotes the single IN_PROGRESS
/// recording to PAUSED.
pub async fn pause_in_progress_recording<C>(db: &C, bot: &bots::Model) -> Result<(), Error>
where
    C: ConnectionTrait,
{
    let in_progress =
        recording_api::find_by_bot_in_states(db, bot.id, &[RecordingState::InProgress]).await?;

    if in_progress.len() != 1 {
        return Err(Error::engine(EngineErrorKind::InvariantViolation(format!(
            "Expected exactly one in progress recording for bot {} in state {}, but found {}",
            bot.object_id,
            bot.state,
            in_progress.len()
        ))));
    }

    set_recording_paused(db, &in_progress[0]).await
}

/// Hook for JOINED_RECORDING_PERMISSION_DENIED: like the pause hook, but a
/// bot that never got to record has nothing to pause, so zero is tolerated.
pub async fn pause_in_progress_recording_if_any<C>(db: &C, bot: &bots::Model) -> Result<(), Error>
where
    C: ConnectionTrait,
{
    let in_progress =
        recording_api::find_by_bot_in_states(db, bot.id, &[RecordingState::InProgress]).await?;

    match in_progress.len() {
        0 => Ok(()),
        1 => set_recording_paused(db, &in_progress[0]).await,
        found => Err(Error::engine(EngineErrorKind::InvariantViolation(format!(
            "Expected at most one in progress recording for bot {} in state {}, but found {found}",
            bot.object_id, bot.state,
        )))),
    }
}

/// Moves the recording into a terminal state when the bot leaves the meeting.
///
/// A recording that produced a media file, or never intended to produce one,
/// completes; otherwise it failed. An in-progress transcription completes iff
/// every utterance resolved; otherwise it fails with the distinct utterance
/// failure reasons, plus a marker when utterances were still pending.
pub async fn terminate_recording<C>(db: &C, recording: &recordings::Model) -> Result<(), Error>
where
    C: ConnectionTrait,
{
    let mut recording = recording_api::find_by_id(db, recording.id).await?;

    if ACTIVE_STATES.contains(&recording.state) {
        if recording.has_file() || recording.recording_kind == RecordingKind::NoRecording {
            set_recording_complete(db, &recording).await?;
        } else {
            set_recording_failed(db, &recording).await?;
        }
        recording = recording_api::find_by_id(db, recording.id).await?;
    }

    if recording.transcription_state == RecordingTranscriptionState::InProgress {
        let any_in_progress = utterance_api::any_in_progress(db, recording.id).await?;
        let any_failed = utterance_api::any_failed(db, recording.id).await?;

        if any_failed || any_in_progress {
            let mut failure_reasons =
                utterance_api::distinct_failure_reasons(db, recording.id).await?;
            if any_in_progress {
                failure_reasons.push(
                    TranscriptionFailureReason::UtterancesStillInProgressWhenRecordingTerminated
                        .as_str()
                        .to_owned(),
                );
            }
            set_recording_transcription_failed(
                db,
                &recording,
                serde_json::json!({ "failure_reasons": failure_reasons }),
            )
            .await?;
        } else {
            set_recording_transcription_complete(db, &recording).await?;
        }
    }

    Ok(())
}

/// The bot's single active recording, if one exists.
pub async fn get_recording_in_progress<C>(
    db: &C,
    bot: &bots::Model,
) -> Result<Option<recordings::Model>, Error>
where
    C: ConnectionTrait,
{
    let active = recording_api::find_by_bot_in_states(db, bot.id, ACTIVE_STATES).await?;
    if active.len() > 1 {
        return Err(Error::engine(EngineErrorKind::InvariantViolation(format!(
            "Expected at most one recording in progress for bot {}, but found {}",
            bot.object_id,
            active.len(),
        ))));
    }
    Ok(active.into_iter().next())
}

pub async fn set_recording_in_progress<C>(
    db: &C,
    recording: &recordings::Model,
) -> Result<(), Error>
where
    C: ConnectionTrait,
{
    let mut recording = recording_api::find_by_id(db, recording.id).await?;

    if recording.state == RecordingState::InProgress {
        return Ok(());
    }
    if !STARTABLE_STATES.contains(&recording.state) {
        return Err(invalid_recording_transition(&recording));
    }

    // started_at marks the first start; resuming from pause keeps it.
    if recording.state != RecordingState::Paused {
        recording.started_at = Some(chrono::Utc::now().into());
    }
    recording.state = RecordingState::InProgress;
    recording_api::update_with_version(db, &recording).await?;
    Ok(())
}

pub async fn set_recording_paused<C>(db: &C, recording: &recordings::Model) -> Result<(), Error>
where
    C: ConnectionTrait,
{
    let mut recording = recording_api::find_by_id(db, recording.id).await?;

    if recording.state == RecordingState::Paused {
        return Ok(());
    }
    if recording.state != RecordingState::InProgress {
        return Err(invalid_recording_transition(&recording));
    }

    recording.state = RecordingState::Paused;
    recording_api::update_with_version(db, &recording).await?;
    Ok(())
}

pub async fn set_recording_complete<C>(db: &C, recording: &recordings::Model) -> Result<(), Error>
where
    C: ConnectionTrait,
{
    let mut recording = recording_api::find_by_id(db, recording.id).await?;

    if recording.state == RecordingState::Complete {
        return Ok(());
    }
    if !ACTIVE_STATES.contains(&recording.state) {
        return Err(invalid_recording_transition(&recording));
    }

    recording.state = RecordingState::Complete;
    recording.completed_at = Some(chrono::Utc::now().into());
    recording_api::update_with_version(db, &recording).await?;

    // An in-progress transcription with nothing left to transcribe can close out now.
    if recording.transcription_state == RecordingTranscriptionState::InProgress
        && !utterance_api::any_untranscribed(db, recording.id).await?
    {
        let recording = recording_api::find_by_id(db, recording.id).await?;
        set_recording_transcription_complete(db, &recording).await?;
    }
    Ok(())
}

pub async fn set_recording_failed<C>(db: &C, recording: &recordings::Model) -> Result<(), Error>
where
    C: ConnectionTrait,
{
    let mut recording = recording_api::find_by_id(db, recording.id).await?;

    if recording.state == RecordingState::Failed {
        return Ok(());
    }
    if !ACTIVE_STATES.contains(&recording.state) {
        return Err(invalid_recording_transition(&recording));
    }

    recording.state = RecordingState::Failed;
    recording_api::update_with_version(db, &recording).await?;
    Ok(())
}

pub async fn set_recording_transcription_in_progress<C>(
    db: &C,
    recording: &recordings::Model,
) -> Result<(), Error>
where
    C: ConnectionTrait,
{
    let mut recording = recording_api::find_by_id(db, recording.id).await?;

    if recording.transcription_state == RecordingTranscriptionState::InProgress {
        return Ok(());
    }
    if recording.transcription_state != RecordingTranscriptionState::NotStarted {
        return Err(invalid_transcription_transition(&recording));
    }

    recording.transcription_state = RecordingTranscriptionState::InProgress;
    recording_api::update_with_version(db, &recording).await?;
    Ok(())
}

pub async fn set_recording_transcription_complete<C>(
    db: &C,
    recording: &recordings::Model,
) -> Result<(), Error>
where
    C: ConnectionTrait,
{
    let mut recording = recording_api::find_by_id(db, recording.id).await?;

    if recording.transcription_state == RecordingTranscriptionState::Complete {
        return Ok(());
    }
    if recording.transcription_state != RecordingTranscriptionState::InProgress {
        return Err(invalid_transcription_transition(&recording));
    }
    if !recording.state.is_terminal() {
        return Err(invalid_recording_transition(&recording));
    }

    recording.transcription_state = RecordingTranscriptionState::Complete;
    recording_api::update_with_version(db, &recording).await?;
    Ok(())
}

pub async fn set_recording_transcription_failed<C>(
    db: &C,
    recording: &recordings::Model,
    failure_data: serde_json::Value,
) -> Result<(), Error>
where
    C: ConnectionTrait,
{
    let mut recording = recording_api::find_by_id(db, recording.id).await?;

    if recording.transcription_state == RecordingTranscriptionState::Failed {
        return Ok(());
    }
    if recording.transcription_state != RecordingTranscriptionState::InProgress {
        return Err(invalid_transcription_transition(&recording));
    }

    warn!(
        "Marking transcription of recording {} failed: {failure_data}",
        recording.object_id
    );

    recording.transcription_state = RecordingTranscriptionState::Failed;
    recording.transcription_failure_data = Some(failure_data);
    recording_api::update_with_version(db, &recording).await?;
    Ok(())
}

fn invalid_recording_transition(recording: &recordings::Model) -> Error {
    Error::engine(EngineErrorKind::InvariantViolation(format!(
        "Invalid state transition. Recording {} is in state {}",
        recording.object_id, recording.state
    )))
}

fn invalid_transcription_transition(recording: &recordings::Model) -> Error {
    Error::engine(EngineErrorKind::InvariantViolation(format!(
        "Invalid state transition. Recording {} is in transcription state {}",
        recording.object_id, recording.transcription_state
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_reason_codes_are_stable() {
        assert_eq!(
            TranscriptionFailureReason::UtterancesStillInProgressWhenRecordingTerminated.as_str(),
            "utterances_still_in_progress_when_recording_terminated"
        );
        assert_eq!(
            TranscriptionFailureReason::CredentialsNotFound.as_str(),
            "credentials_not_found"
        );
        assert_eq!(TranscriptionFailureReason::TimedOut.as_str(), "timed_out");
    }

    #[test]
    fn active_states_are_in_progress_and_paused() {
        assert!(ACTIVE_STATES.contains(&RecordingState::InProgress));
        assert!(ACTIVE_STATES.contains(&RecordingState::Paused));
        assert!(!ACTIVE_STATES.contains(&RecordingState::NotStarted));
        assert!(!ACTIVE_STATES.contains(&RecordingState::Complete));
    }
}

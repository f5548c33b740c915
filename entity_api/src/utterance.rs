//! Queries over the utterances table.

use super::error::Error;
use entity::utterances::{Column, Entity, Model};
use entity::Id;
use sea_orm::{entity::prelude::*, ConnectionTrait, QuerySelect};

/// Whether any utterance of the recording is still waiting on transcription.
pub async fn any_in_progress<C>(db: &C, recording_id: Id) -> Result<bool, Error>
where
    C: ConnectionTrait,
{
    let count = Entity::find()
        .filter(Column::RecordingId.eq(recording_id))
        .filter(Column::Transcription.is_null())
        .filter(Column::FailureData.is_null())
        .count(db)
        .await?;
    Ok(count > 0)
}

/// Whether any utterance of the recording failed transcription.
pub async fn any_failed<C>(db: &C, recording_id: Id) -> Result<bool, Error>
where
    C: ConnectionTrait,
{
    let count = Entity::find()
        .filter(Column::RecordingId.eq(recording_id))
        .filter(Column::FailureData.is_not_null())
        .count(db)
        .await?;
    Ok(count > 0)
}

/// Whether any utterance of the recording has no transcription yet,
/// regardless of failure state.
pub async fn any_untranscribed<C>(db: &C, recording_id: Id) -> Result<bool, Error>
where
    C: ConnectionTrait,
{
    let count = Entity::find()
        .filter(Column::RecordingId.eq(recording_id))
        .filter(Column::Transcription.is_null())
        .count(db)
        .await?;
    Ok(count > 0)
}

/// Distinct `reason` values from the failure data of failed utterances,
/// in first-seen order.
pub async fn distinct_failure_reasons<C>(db: &C, recording_id: Id) -> Result<Vec<String>, Error>
where
    C: ConnectionTrait,
{
    let failure_blobs: Vec<Option<Json>> = Entity::find()
        .select_only()
        .column(Column::FailureData)
        .filter(Column::RecordingId.eq(recording_id))
        .filter(Column::FailureData.is_not_null())
        .into_tuple()
        .all(db)
        .await?;

    let mut reasons: Vec<String> = Vec::new();
    for blob in failure_blobs.into_iter().flatten() {
        if let Some(reason) = blob.get("reason").and_then(|r| r.as_str()) {
            if !reasons.iter().any(|existing| existing == reason) {
                reasons.push(reason.to_owned());
            }
        }
    }
    Ok(reasons)
}

pub async fn find_all_for_recording<C>(db: &C, recording_id: Id) -> Result<Vec<Model>, Error>
where
    C: ConnectionTrait,
{
    Ok(Entity::find()
        .filter(Column::RecordingId.eq(recording_id))
        .all(db)
        .await?)
}

/// Removes all utterances belonging to any of the given recordings.
pub async fn delete_by_recording_ids<C>(db: &C, recording_ids: &[Id]) -> Result<u64, Error>
where
    C: ConnectionTrait,
{
    if recording_ids.is_empty() {
        return Ok(0);
    }
    let result = Entity::delete_many()
        .filter(Column::RecordingId.is_in(recording_ids.to_vec()))
        .exec(db)
        .await?;
    Ok(result.rows_affected)
}

//! CRUD and compare-and-swap operations for the recordings table.

use super::error::Error;
use entity::recording_state::RecordingState;
use entity::recording_transcription_state::RecordingTranscriptionState;
use entity::recordings::{ActiveModel, Column, Entity, Model};
use entity::Id;
use log::*;
use sea_orm::{entity::prelude::*, sea_query::Expr, ActiveValue::Set, ConnectionTrait, QueryOrder};

pub async fn create<C>(db: &C, model: Model) -> Result<Model, Error>
where
    C: ConnectionTrait,
{
    debug!(
        "Creating new recording {} for bot {}",
        model.object_id, model.bot_id
    );

    let now = chrono::Utc::now();

    let active_model = ActiveModel {
        id: Set(Id::new_v4()),
        object_id: Set(model.object_id),
        bot_id: Set(model.bot_id),
        recording_kind: Set(model.recording_kind),
        transcription_kind: Set(model.transcription_kind),
        is_default_recording: Set(model.is_default_recording),
        state: Set(model.state),
        transcription_state: Set(model.transcription_state),
        transcription_failure_data: Set(model.transcription_failure_data),
        transcription_provider: Set(model.transcription_provider),
        file_name: Set(model.file_name),
        started_at: Set(model.started_at),
        completed_at: Set(model.completed_at),
        version: Set(0),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    };

    Ok(active_model.insert(db).await?)
}

pub async fn find_by_id<C>(db: &C, id: Id) -> Result<Model, Error>
where
    C: ConnectionTrait,
{
    Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(Error::record_not_found)
}

/// Recordings for a bot currently holding one of the given states.
pub async fn find_by_bot_in_states<C>(
    db: &C,
    bot_id: Id,
    states: &[RecordingState],
) -> Result<Vec<Model>, Error>
where
    C: ConnectionTrait,
{
    Ok(Entity::find()
        .filter(Column::BotId.eq(bot_id))
        .filter(Column::State.is_in(states.to_vec()))
        .order_by_asc(Column::CreatedAt)
        .all(db)
        .await?)
}

/// Recordings for a bot whose transcription ended in failure.
pub async fn find_with_failed_transcription<C>(db: &C, bot_id: Id) -> Result<Vec<Model>, Error>
where
    C: ConnectionTrait,
{
    Ok(Entity::find()
        .filter(Column::BotId.eq(bot_id))
        .filter(Column::TranscriptionState.eq(RecordingTranscriptionState::Failed))
        .order_by_asc(Column::CreatedAt)
        .all(db)
        .await?)
}

pub async fn find_all_for_bot<C>(db: &C, bot_id: Id) -> Result<Vec<Model>, Error>
where
    C: ConnectionTrait,
{
    Ok(Entity::find()
        .filter(Column::BotId.eq(bot_id))
        .order_by_asc(Column::CreatedAt)
        .all(db)
        .await?)
}

/// Writes back every mutable column of `model` iff its version is still
/// current, bumping the version. A lost race surfaces as `StaleVersion`.
pub async fn update_with_version<C>(db: &C, model: &Model) -> Result<(), Error>
where
    C: ConnectionTrait,
{
    let result = Entity::update_many()
        .col_expr(Column::State, Expr::value(model.state))
        .col_expr(
            Column::TranscriptionState,
            Expr::value(model.transcription_state),
        )
        .col_expr(
            Column::TranscriptionFailureData,
            Expr::value(model.transcription_failure_data.clone()),
        )
        .col_expr(Column::FileName, Expr::value(model.file_name.clone()))
        .col_expr(Column::StartedAt, Expr::value(model.started_at))
        .col_expr(Column::CompletedAt, Expr::value(model.completed_at))
        .col_expr(Column::Version, Expr::col(Column::Version).add(1))
        .col_expr(
            Column::UpdatedAt,
            Expr::value(DateTimeWithTimeZone::from(chrono::Utc::now())),
        )
        .filter(Column::Id.eq(model.id))
        .filter(Column::Version.eq(model.version))
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        debug!(
            "Stale write for recording {} at version {}",
            model.object_id, model.version
        );
        return Err(Error::stale_version());
    }
    Ok(())
}

/// Clears the stored media file handle, used by data deletion.
pub async fn clear_files_for_bot<C>(db: &C, bot_id: Id) -> Result<(), Error>
where
    C: ConnectionTrait,
{
    Entity::update_many()
        .col_expr(Column::FileName, Expr::value(Option::<String>::None))
        .col_expr(
            Column::UpdatedAt,
            Expr::value(DateTimeWithTimeZone::from(chrono::Utc::now())),
        )
        .filter(Column::BotId.eq(bot_id))
        .exec(db)
        .await?;
    Ok(())
}

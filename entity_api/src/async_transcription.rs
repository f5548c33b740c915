//! CRUD and compare-and-swap operations for the async_transcriptions table.

use super::error::Error;
use entity::async_transcriptions::{ActiveModel, Column, Entity, Model};
use entity::Id;
use log::*;
use sea_orm::{entity::prelude::*, sea_query::Expr, ActiveValue::Set, ConnectionTrait};

pub async fn create<C>(db: &C, model: Model) -> Result<Model, Error>
where
    C: ConnectionTrait,
{
    debug!(
        "Creating async transcription {} for recording {}",
        model.object_id, model.recording_id
    );

    let now = chrono::Utc::now();

    let active_model = ActiveModel {
        id: Set(Id::new_v4()),
        object_id: Set(model.object_id),
        recording_id: Set(model.recording_id),
        state: Set(model.state),
        settings: Set(model.settings),
        failure_data: Set(model.failure_data),
        started_at: Set(model.started_at),
        failed_at: Set(model.failed_at),
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

/// Writes back the mutable columns of `model` iff its version is still
/// current, bumping the version.
pub async fn update_with_version<C>(db: &C, model: &Model) -> Result<(), Error>
where
    C: ConnectionTrait,
{
    let result = Entity::update_many()
        .col_expr(Column::State, Expr::value(model.state))
        .col_expr(
            Column::FailureData,
            Expr::value(model.failure_data.clone()),
        )
        .col_expr(Column::StartedAt, Expr::value(model.started_at))
        .col_expr(Column::FailedAt, Expr::value(model.failed_at))
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
        return Err(Error::stale_version());
    }
    Ok(())
}

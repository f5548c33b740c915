//! CRUD operations for the webhook_subscriptions table.

use super::error::Error;
use entity::webhook_subscriptions::{ActiveModel, Column, Entity, Model};
use entity::Id;
use log::*;
use sea_orm::{entity::prelude::*, ActiveValue::Set, ConnectionTrait};

pub async fn create<C>(db: &C, model: Model) -> Result<Model, Error>
where
    C: ConnectionTrait,
{
    debug!(
        "Creating webhook subscription {} for project {}",
        model.object_id, model.project_id
    );

    let now = chrono::Utc::now();

    let active_model = ActiveModel {
        id: Set(Id::new_v4()),
        object_id: Set(model.object_id),
        project_id: Set(model.project_id),
        bot_id: Set(model.bot_id),
        url: Set(model.url),
        triggers: Set(model.triggers),
        is_active: Set(model.is_active),
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

/// All active subscriptions for a project. Trigger and bot-scope filtering
/// happens in the domain layer, on the decoded trigger list.
pub async fn find_active_for_project<C>(db: &C, project_id: Id) -> Result<Vec<Model>, Error>
where
    C: ConnectionTrait,
{
    Ok(Entity::find()
        .filter(Column::ProjectId.eq(project_id))
        .filter(Column::IsActive.eq(true))
        .all(db)
        .await?)
}

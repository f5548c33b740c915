//! CRUD operations for the webhook_secrets table.

use super::error::Error;
use entity::webhook_secrets::{ActiveModel, Column, Entity, Model};
use entity::Id;
use log::*;
use sea_orm::{entity::prelude::*, ActiveValue::Set, ConnectionTrait, QueryOrder};

pub async fn create<C>(db: &C, model: Model) -> Result<Model, Error>
where
    C: ConnectionTrait,
{
    debug!("Creating webhook secret for project {}", model.project_id);

    let now = chrono::Utc::now();

    let active_model = ActiveModel {
        id: Set(Id::new_v4()),
        project_id: Set(model.project_id),
        encrypted_secret: Set(model.encrypted_secret),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    };

    Ok(active_model.insert(db).await?)
}

/// The project's newest webhook secret, used for signing outgoing payloads.
pub async fn find_latest_for_project<C>(db: &C, project_id: Id) -> Result<Option<Model>, Error>
where
    C: ConnectionTrait,
{
    Ok(Entity::find()
        .filter(Column::ProjectId.eq(project_id))
        .order_by_desc(Column::CreatedAt)
        .one(db)
        .await?)
}

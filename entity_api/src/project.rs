//! CRUD operations for the projects table.

use super::error::Error;
use entity::projects::{ActiveModel, Column, Entity, Model};
use entity::Id;
use log::*;
use sea_orm::{entity::prelude::*, ActiveValue::Set, ConnectionTrait};

pub async fn create<C>(db: &C, model: Model) -> Result<Model, Error>
where
    C: ConnectionTrait,
{
    debug!("Creating new project {} ({})", model.name, model.object_id);

    let now = chrono::Utc::now();

    let active_model = ActiveModel {
        id: Set(Id::new_v4()),
        object_id: Set(model.object_id),
        organization_id: Set(model.organization_id),
        name: Set(model.name),
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

pub async fn find_by_object_id<C>(db: &C, object_id: &str) -> Result<Model, Error>
where
    C: ConnectionTrait,
{
    Entity::find()
        .filter(Column::ObjectId.eq(object_id))
        .one(db)
        .await?
        .ok_or_else(Error::record_not_found)
}

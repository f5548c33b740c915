//! CRUD operations for the participants table.

use super::error::Error;
use entity::participants::{ActiveModel, Column, Entity, Model};
use entity::Id;
use log::*;
use sea_orm::{entity::prelude::*, ActiveValue::Set, ConnectionTrait};

pub async fn create<C>(db: &C, model: Model) -> Result<Model, Error>
where
    C: ConnectionTrait,
{
    debug!(
        "Creating participant {} for bot {}",
        model.object_id, model.bot_id
    );

    let now = chrono::Utc::now();

    let active_model = ActiveModel {
        id: Set(Id::new_v4()),
        object_id: Set(model.object_id),
        bot_id: Set(model.bot_id),
        uuid: Set(model.uuid),
        full_name: Set(model.full_name),
        is_the_bot: Set(model.is_the_bot),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    };

    Ok(active_model.insert(db).await?)
}

pub async fn delete_by_bot<C>(db: &C, bot_id: Id) -> Result<u64, Error>
where
    C: ConnectionTrait,
{
    let result = Entity::delete_many()
        .filter(Column::BotId.eq(bot_id))
        .exec(db)
        .await?;
    Ok(result.rows_affected)
}

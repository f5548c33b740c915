//! CRUD operations for the chat_messages table.

use super::error::Error;
use entity::chat_messages::{ActiveModel, Column, Entity, Model};
use entity::Id;
use log::*;
use sea_orm::{entity::prelude::*, ActiveValue::Set, ConnectionTrait};

pub async fn create<C>(db: &C, model: Model) -> Result<Model, Error>
where
    C: ConnectionTrait,
{
    debug!(
        "Creating chat message {} for bot {}",
        model.object_id, model.bot_id
    );

    let now = chrono::Utc::now();

    let active_model = ActiveModel {
        id: Set(Id::new_v4()),
        object_id: Set(model.object_id),
        bot_id: Set(model.bot_id),
        participant_id: Set(model.participant_id),
        text: Set(model.text),
        timestamp: Set(model.timestamp),
        additional_data: Set(model.additional_data),
        source_uuid: Set(model.source_uuid),
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

//! Operations for the bot_resource_snapshots table.

use super::error::Error;
use entity::bot_resource_snapshots::{ActiveModel, Column, Entity, Model};
use entity::Id;
use sea_orm::{entity::prelude::*, ActiveValue::Set, ConnectionTrait, QueryOrder};

pub async fn create<C>(db: &C, bot_id: Id, data: Json) -> Result<Model, Error>
where
    C: ConnectionTrait,
{
    let now = chrono::Utc::now();

    let active_model = ActiveModel {
        id: Set(Id::new_v4()),
        bot_id: Set(bot_id),
        data: Set(data),
        created_at: Set(now.into()),
    };

    Ok(active_model.insert(db).await?)
}

/// The most recent snapshot for a bot, if any were captured.
pub async fn find_latest_for_bot<C>(db: &C, bot_id: Id) -> Result<Option<Model>, Error>
where
    C: ConnectionTrait,
{
    Ok(Entity::find()
        .filter(Column::BotId.eq(bot_id))
        .order_by_desc(Column::CreatedAt)
        .one(db)
        .await?)
}

//! Operations for the bot_debug_screenshots table.

use super::error::Error;
use entity::bot_debug_screenshots::{Column, Entity};
use entity::Id;
use sea_orm::{entity::prelude::*, ConnectionTrait};

/// Removes all screenshots attached to the given bot events.
pub async fn delete_by_bot_event_ids<C>(db: &C, bot_event_ids: &[Id]) -> Result<u64, Error>
where
    C: ConnectionTrait,
{
    if bot_event_ids.is_empty() {
        return Ok(0);
    }
    let result = Entity::delete_many()
        .filter(Column::BotEventId.is_in(bot_event_ids.to_vec()))
        .exec(db)
        .await?;
    Ok(result.rows_affected)
}

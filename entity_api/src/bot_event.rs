//! Append-only operations for the bot_events table.

use super::error::Error;
use entity::bot_event_kind::BotEventKind;
use entity::bot_event_subkind::BotEventSubKind;
use entity::bot_events::{ActiveModel, Column, Entity, Model};
use entity::bot_state::BotState;
use entity::Id;
use log::*;
use sea_orm::{
    entity::prelude::*, ActiveValue::Set, ActiveValue::Unchanged, ConnectionTrait, QueryOrder,
};

#[allow(clippy::too_many_arguments)]
pub async fn create<C>(
    db: &C,
    bot_id: Id,
    old_state: BotState,
    new_state: BotState,
    event_kind: BotEventKind,
    event_subkind: Option<BotEventSubKind>,
    metadata: Json,
) -> Result<Model, Error>
where
    C: ConnectionTrait,
{
    debug!("Appending event {event_kind} for bot {bot_id}: {old_state} -> {new_state}");

    let now = chrono::Utc::now();

    let active_model = ActiveModel {
        id: Set(Id::new_v4()),
        bot_id: Set(bot_id),
        old_state: Set(old_state),
        new_state: Set(new_state),
        event_kind: Set(event_kind),
        event_subkind: Set(event_subkind),
        metadata: Set(metadata),
        requested_action_taken_at: Set(None),
        created_at: Set(now.into()),
    };

    Ok(active_model.insert(db).await?)
}

/// The most recent event for a bot, by creation time.
pub async fn find_last_for_bot<C>(db: &C, bot_id: Id) -> Result<Option<Model>, Error>
where
    C: ConnectionTrait,
{
    Ok(Entity::find()
        .filter(Column::BotId.eq(bot_id))
        .order_by_desc(Column::CreatedAt)
        .one(db)
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

/// Stamps when the action requested by this event was actually executed.
pub async fn stamp_requested_action_taken<C>(db: &C, event: Model) -> Result<Model, Error>
where
    C: ConnectionTrait,
{
    let active_model = ActiveModel {
        id: Unchanged(event.id),
        requested_action_taken_at: Set(Some(chrono::Utc::now().into())),
        ..Default::default()
    };

    Ok(active_model.update(db).await?)
}

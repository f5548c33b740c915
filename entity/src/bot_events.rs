//! SeaORM Entity for the bot_events table.
//!
//! Events are the append-only history of a bot's state machine. Rows are
//! never updated after creation except to stamp `requested_action_taken_at`
//! on requester events.

use crate::bot_event_kind::BotEventKind;
use crate::bot_event_subkind::BotEventSubKind;
use crate::bot_state::BotState;
use crate::Id;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(schema_name = "meetbot", table_name = "bot_events")]
pub struct Model {
    #[serde(skip_deserializing)]
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Id,

    pub bot_id: Id,

    pub old_state: BotState,

    pub new_state: BotState,

    /// What happened.
    pub event_kind: BotEventKind,

    /// Why it happened, for the event kinds that carry a cause.
    pub event_subkind: Option<BotEventSubKind>,

    #[sea_orm(column_type = "JsonBinary")]
    pub metadata: Json,

    /// For requester events, when the requested action was actually executed.
    pub requested_action_taken_at: Option<DateTimeWithTimeZone>,

    #[serde(skip_deserializing)]
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::bots::Entity",
        from = "Column::BotId",
        to = "super::bots::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Bots,

    #[sea_orm(has_many = "super::bot_debug_screenshots::Entity")]
    BotDebugScreenshots,
}

impl Related<super::bots::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Bots.def()
    }
}

impl Related<super::bot_debug_screenshots::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BotDebugScreenshots.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

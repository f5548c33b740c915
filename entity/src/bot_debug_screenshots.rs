//! SeaORM Entity for the bot_debug_screenshots table.
//! Screenshots captured around notable bot events, purged on data deletion.

use crate::Id;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

pub const OBJECT_ID_PREFIX: &str = "shot_";

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(schema_name = "meetbot", table_name = "bot_debug_screenshots")]
pub struct Model {
    #[serde(skip_deserializing)]
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Id,

    #[sea_orm(unique)]
    pub object_id: String,

    pub bot_event_id: Id,

    /// Storage handle of the screenshot image.
    pub file_name: Option<String>,

    #[serde(skip_deserializing)]
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::bot_events::Entity",
        from = "Column::BotEventId",
        to = "super::bot_events::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    BotEvents,
}

impl Related<super::bot_events::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BotEvents.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

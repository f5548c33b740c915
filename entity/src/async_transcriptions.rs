//! SeaORM Entity for the async_transcriptions table.
//! A post-meeting transcription run over an existing recording.

use crate::async_transcription_state::AsyncTranscriptionState;
use crate::Id;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

pub const OBJECT_ID_PREFIX: &str = "tran_";

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(schema_name = "meetbot", table_name = "async_transcriptions")]
pub struct Model {
    #[serde(skip_deserializing)]
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Id,

    #[sea_orm(unique)]
    pub object_id: String,

    pub recording_id: Id,

    pub state: AsyncTranscriptionState,

    #[sea_orm(column_type = "JsonBinary")]
    pub settings: Json,

    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub failure_data: Option<Json>,

    pub started_at: Option<DateTimeWithTimeZone>,

    pub failed_at: Option<DateTimeWithTimeZone>,

    pub completed_at: Option<DateTimeWithTimeZone>,

    /// Optimistic concurrency counter; stale writes are rejected.
    #[serde(skip_deserializing)]
    pub version: i32,

    #[serde(skip_deserializing)]
    pub created_at: DateTimeWithTimeZone,

    #[serde(skip_deserializing)]
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::recordings::Entity",
        from = "Column::RecordingId",
        to = "super::recordings::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Recordings,

    #[sea_orm(has_many = "super::utterances::Entity")]
    Utterances,
}

impl Related<super::recordings::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Recordings.def()
    }
}

impl Related<super::utterances::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Utterances.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

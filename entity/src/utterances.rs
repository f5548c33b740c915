//! SeaORM Entity for the utterances table.
//!
//! Transcription progress is encoded by two nullable columns:
//! both null means in progress, `transcription` set means success,
//! `failure_data` set means the utterance failed.

use crate::Id;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(schema_name = "meetbot", table_name = "utterances")]
pub struct Model {
    #[serde(skip_deserializing)]
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Id,

    pub recording_id: Id,

    /// Set when the utterance belongs to a post-meeting transcription run.
    pub async_transcription_id: Option<Id>,

    pub participant_id: Id,

    pub timestamp_ms: i64,

    pub duration_ms: i32,

    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub transcription: Option<Json>,

    pub transcription_attempt_count: i32,

    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub failure_data: Option<Json>,

    #[sea_orm(unique)]
    pub source_uuid: Option<String>,

    #[serde(skip_deserializing)]
    pub created_at: DateTimeWithTimeZone,

    #[serde(skip_deserializing)]
    pub updated_at: DateTimeWithTimeZone,
}

impl Model {
    pub fn is_in_progress(&self) -> bool {
        self.transcription.is_none() && self.failure_data.is_none()
    }

    pub fn is_failed(&self) -> bool {
        self.failure_data.is_some()
    }
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

    #[sea_orm(
        belongs_to = "super::async_transcriptions::Entity",
        from = "Column::AsyncTranscriptionId",
        to = "super::async_transcriptions::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    AsyncTranscriptions,

    #[sea_orm(
        belongs_to = "super::participants::Entity",
        from = "Column::ParticipantId",
        to = "super::participants::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Participants,
}

impl Related<super::recordings::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Recordings.def()
    }
}

impl Related<super::participants::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Participants.def()
    }
}

impl Related<super::async_transcriptions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AsyncTranscriptions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

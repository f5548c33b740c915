//! SeaORM Entity for the recordings table.
//!
//! A bot can accumulate several recordings over its lifetime but at most one
//! of them is IN_PROGRESS or PAUSED at any moment.

use crate::recording_kind::RecordingKind;
use crate::recording_state::RecordingState;
use crate::recording_transcription_state::RecordingTranscriptionState;
use crate::transcription_kind::TranscriptionKind;
use crate::transcription_provider::TranscriptionProvider;
use crate::Id;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

pub const OBJECT_ID_PREFIX: &str = "rec_";

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(schema_name = "meetbot", table_name = "recordings")]
pub struct Model {
    #[serde(skip_deserializing)]
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Id,

    #[sea_orm(unique)]
    pub object_id: String,

    pub bot_id: Id,

    pub recording_kind: RecordingKind,

    pub transcription_kind: TranscriptionKind,

    pub is_default_recording: bool,

    pub state: RecordingState,

    pub transcription_state: RecordingTranscriptionState,

    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub transcription_failure_data: Option<Json>,

    pub transcription_provider: Option<TranscriptionProvider>,

    /// Storage handle of the uploaded media file, if one was produced.
    pub file_name: Option<String>,

    /// Stamped on the first start only, not on resume.
    pub started_at: Option<DateTimeWithTimeZone>,

    pub completed_at: Option<DateTimeWithTimeZone>,

    /// Optimistic concurrency counter; stale writes are rejected.
    #[serde(skip_deserializing)]
    pub version: i32,

    #[serde(skip_deserializing)]
    pub created_at: DateTimeWithTimeZone,

    #[serde(skip_deserializing)]
    pub updated_at: DateTimeWithTimeZone,
}

impl Model {
    /// Whether a media file was produced for this recording.
    pub fn has_file(&self) -> bool {
        self.file_name.as_deref().is_some_and(|name| !name.is_empty())
    }
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

    #[sea_orm(has_many = "super::utterances::Entity")]
    Utterances,

    #[sea_orm(has_many = "super::async_transcriptions::Entity")]
    AsyncTranscriptions,
}

impl Related<super::bots::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Bots.def()
    }
}

impl Related<super::utterances::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Utterances.def()
    }
}

impl Related<super::async_transcriptions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AsyncTranscriptions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

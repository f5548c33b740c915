use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// State of the transcription attached to a recording.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[sea_orm(rs_type = "i32", db_type = "Integer")]
pub enum RecordingTranscriptionState {
    #[sea_orm(num_value = 1)]
    #[default]
    NotStarted,
    #[sea_orm(num_value = 2)]
    InProgress,
    #[sea_orm(num_value = 3)]
    Complete,
    #[sea_orm(num_value = 4)]
    Failed,
}

impl RecordingTranscriptionState {
    pub fn api_code(&self) -> &'static str {
        match self {
            RecordingTranscriptionState::NotStarted => "not_started",
            RecordingTranscriptionState::InProgress => "in_progress",
            RecordingTranscriptionState::Complete => "complete",
            RecordingTranscriptionState::Failed => "failed",
        }
    }
}

impl std::fmt::Display for RecordingTranscriptionState {
    fn fmt(&self, fmt: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(fmt, "{}", self.api_code())
    }
}

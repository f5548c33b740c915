use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// State of a post-meeting transcription run.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[sea_orm(rs_type = "i32", db_type = "Integer")]
pub enum AsyncTranscriptionState {
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

impl AsyncTranscriptionState {
    pub fn api_code(&self) -> &'static str {
        match self {
            AsyncTranscriptionState::NotStarted => "not_started",
            AsyncTranscriptionState::InProgress => "in_progress",
            AsyncTranscriptionState::Complete => "complete",
            AsyncTranscriptionState::Failed => "failed",
        }
    }
}

impl std::fmt::Display for AsyncTranscriptionState {
    fn fmt(&self, fmt: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(fmt, "{}", self.api_code())
    }
}

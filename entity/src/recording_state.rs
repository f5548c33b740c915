use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// State of a recording through its lifecycle.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[sea_orm(rs_type = "i32", db_type = "Integer")]
pub enum RecordingState {
    #[sea_orm(num_value = 1)]
    #[default]
    NotStarted,
    #[sea_orm(num_value = 2)]
    InProgress,
    #[sea_orm(num_value = 3)]
    Complete,
    #[sea_orm(num_value = 4)]
    Failed,
    #[sea_orm(num_value = 5)]
    Paused,
}

impl RecordingState {
    pub fn api_code(&self) -> &'static str {
        match self {
            RecordingState::NotStarted => "not_started",
            RecordingState::InProgress => "in_progress",
            RecordingState::Complete => "complete",
            RecordingState::Failed => "failed",
            RecordingState::Paused => "paused",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, RecordingState::Complete | RecordingState::Failed)
    }
}

impl std::fmt::Display for RecordingState {
    fn fmt(&self, fmt: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(fmt, "{}", self.api_code())
    }
}

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// State of a bot session through its lifecycle.
///
/// The numeric codes are stable and stored in the database; the string codes
/// returned by `api_code` are what API consumers and webhook payloads see.
/// Codes 100 and up belong to the app-session sub-graph.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[sea_orm(rs_type = "i32", db_type = "Integer")]
pub enum BotState {
    #[sea_orm(num_value = 1)]
    #[default]
    Ready,
    #[sea_orm(num_value = 2)]
    Joining,
    #[sea_orm(num_value = 3)]
    JoinedNotRecording,
    #[sea_orm(num_value = 4)]
    JoinedRecording,
    #[sea_orm(num_value = 5)]
    Leaving,
    #[sea_orm(num_value = 6)]
    PostProcessing,
    #[sea_orm(num_value = 7)]
    FatalError,
    #[sea_orm(num_value = 8)]
    WaitingRoom,
    #[sea_orm(num_value = 9)]
    Ended,
    #[sea_orm(num_value = 10)]
    DataDeleted,
    #[sea_orm(num_value = 11)]
    Scheduled,
    #[sea_orm(num_value = 12)]
    Staged,
    #[sea_orm(num_value = 13)]
    JoinedRecordingPaused,
    #[sea_orm(num_value = 14)]
    JoiningBreakoutRoom,
    #[sea_orm(num_value = 15)]
    LeavingBreakoutRoom,
    #[sea_orm(num_value = 16)]
    JoinedRecordingPermissionDenied,

    // App session states
    #[sea_orm(num_value = 100)]
    Connecting,
    #[sea_orm(num_value = 101)]
    Connected,
    #[sea_orm(num_value = 102)]
    Disconnecting,
}

impl BotState {
    /// Returns the API code for this state. Numeric codes never leak to clients.
    pub fn api_code(&self) -> &'static str {
        match self {
            BotState::Ready => "ready",
            BotState::Joining => "joining",
            BotState::JoinedNotRecording => "joined_not_recording",
            BotState::JoinedRecording => "joined_recording",
            BotState::Leaving => "leaving",
            BotState::PostProcessing => "post_processing",
            BotState::FatalError => "fatal_error",
            BotState::WaitingRoom => "waiting_room",
            BotState::Ended => "ended",
            BotState::DataDeleted => "data_deleted",
            BotState::Scheduled => "scheduled",
            BotState::Staged => "staged",
            BotState::JoinedRecordingPaused => "joined_recording_paused",
            BotState::JoiningBreakoutRoom => "joining_breakout_room",
            BotState::LeavingBreakoutRoom => "leaving_breakout_room",
            BotState::JoinedRecordingPermissionDenied => "joined_recording_permission_denied",
            BotState::Connecting => "connecting",
            BotState::Connected => "connected",
            BotState::Disconnecting => "disconnecting",
        }
    }

    /// Returns the state for a given API code.
    pub fn from_api_code(api_code: &str) -> Option<Self> {
        use sea_orm::Iterable;
        BotState::iter().find(|state| state.api_code() == api_code)
    }

    pub fn post_meeting_states() -> &'static [BotState] {
        &[BotState::FatalError, BotState::Ended, BotState::DataDeleted]
    }

    pub fn pre_meeting_states() -> &'static [BotState] {
        &[BotState::Ready, BotState::Scheduled, BotState::Staged]
    }

    pub fn is_post_meeting(&self) -> bool {
        Self::post_meeting_states().contains(self)
    }

    pub fn is_pre_meeting(&self) -> bool {
        Self::pre_meeting_states().contains(self)
    }

    /// In-meeting states are everything that is neither pre- nor post-meeting.
    pub fn is_in_meeting(&self) -> bool {
        !self.is_pre_meeting() && !self.is_post_meeting()
    }
}

impl std::fmt::Display for BotState {
    fn fmt(&self, fmt: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(fmt, "{}", self.api_code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::Iterable;

    #[test]
    fn api_codes_roundtrip() {
        for state in BotState::iter() {
            assert_eq!(BotState::from_api_code(state.api_code()), Some(state));
        }
    }

    #[test]
    fn state_groupings_partition_the_graph() {
        for state in BotState::iter() {
            let memberships = [
                state.is_pre_meeting(),
                state.is_in_meeting(),
                state.is_post_meeting(),
            ];
            assert_eq!(
                memberships.iter().filter(|m| **m).count(),
                1,
                "{state} must belong to exactly one grouping"
            );
        }
    }

    #[test]
    fn app_session_states_are_in_meeting() {
        assert!(BotState::Connecting.is_in_meeting());
        assert!(BotState::Connected.is_in_meeting());
        assert!(BotState::Disconnecting.is_in_meeting());
    }
}

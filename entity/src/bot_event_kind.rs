use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// What happened to a bot. Codes 100 and up are app-session events.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[sea_orm(rs_type = "i32", db_type = "Integer")]
pub enum BotEventKind {
    #[sea_orm(num_value = 1)]
    BotPutInWaitingRoom,
    #[sea_orm(num_value = 2)]
    BotJoinedMeeting,
    #[sea_orm(num_value = 3)]
    BotRecordingPermissionGranted,
    #[sea_orm(num_value = 4)]
    MeetingEnded,
    #[sea_orm(num_value = 5)]
    BotLeftMeeting,
    #[sea_orm(num_value = 6)]
    JoinRequested,
    #[sea_orm(num_value = 7)]
    FatalError,
    #[sea_orm(num_value = 8)]
    LeaveRequested,
    #[sea_orm(num_value = 9)]
    CouldNotJoin,
    #[sea_orm(num_value = 10)]
    PostProcessingCompleted,
    #[sea_orm(num_value = 11)]
    DataDeleted,
    #[sea_orm(num_value = 12)]
    Staged,
    #[sea_orm(num_value = 13)]
    RecordingPaused,
    #[sea_orm(num_value = 14)]
    RecordingResumed,
    #[sea_orm(num_value = 15)]
    BotJoinedBreakoutRoom,
    #[sea_orm(num_value = 16)]
    BotLeftBreakoutRoom,
    #[sea_orm(num_value = 17)]
    BotBeganJoiningBreakoutRoom,
    #[sea_orm(num_value = 18)]
    BotBeganLeavingBreakoutRoom,
    #[sea_orm(num_value = 19)]
    BotRecordingPermissionDenied,

    // App session events
    #[sea_orm(num_value = 100)]
    AppSessionConnectionRequested,
    #[sea_orm(num_value = 101)]
    AppSessionConnected,
    #[sea_orm(num_value = 102)]
    AppSessionDisconnectRequested,
    #[sea_orm(num_value = 103)]
    AppSessionDisconnected,
}

impl BotEventKind {
    pub fn api_code(&self) -> &'static str {
        match self {
            BotEventKind::BotPutInWaitingRoom => "put_in_waiting_room",
            BotEventKind::BotJoinedMeeting => "joined_meeting",
            BotEventKind::BotRecordingPermissionGranted => "recording_permission_granted",
            BotEventKind::MeetingEnded => "meeting_ended",
            BotEventKind::BotLeftMeeting => "left_meeting",
            BotEventKind::JoinRequested => "join_requested",
            BotEventKind::FatalError => "fatal_error",
            BotEventKind::LeaveRequested => "leave_requested",
            BotEventKind::CouldNotJoin => "could_not_join_meeting",
            BotEventKind::PostProcessingCompleted => "post_processing_completed",
            BotEventKind::DataDeleted => "data_deleted",
            BotEventKind::Staged => "staged",
            BotEventKind::RecordingPaused => "recording_paused",
            BotEventKind::RecordingResumed => "recording_resumed",
            BotEventKind::BotJoinedBreakoutRoom => "joined_breakout_room",
            BotEventKind::BotLeftBreakoutRoom => "left_breakout_room",
            BotEventKind::BotBeganJoiningBreakoutRoom => "began_joining_breakout_room",
            BotEventKind::BotBeganLeavingBreakoutRoom => "began_leaving_breakout_room",
            BotEventKind::BotRecordingPermissionDenied => "recording_permission_denied",
            BotEventKind::AppSessionConnectionRequested => "app_session_connection_requested",
            BotEventKind::AppSessionConnected => "app_session_connected",
            BotEventKind::AppSessionDisconnectRequested => "app_session_disconnect_requested",
            BotEventKind::AppSessionDisconnected => "app_session_disconnected",
        }
    }
}

impl std::fmt::Display for BotEventKind {
    fn fmt(&self, fmt: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(fmt, "{}", self.api_code())
    }
}

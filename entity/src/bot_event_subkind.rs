use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::bot_event_kind::BotEventKind;

/// Why a bot event happened. Only a handful of event kinds carry a subkind;
/// the permitted combinations are enforced by `combination_is_valid` and by a
/// database check constraint.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[sea_orm(rs_type = "i32", db_type = "Integer")]
pub enum BotEventSubKind {
    #[sea_orm(num_value = 1)]
    CouldNotJoinMeetingNotStartedWaitingForHost,
    #[sea_orm(num_value = 2)]
    FatalErrorProcessTerminated,
    #[sea_orm(num_value = 3)]
    CouldNotJoinZoomAuthorizationFailed,
    #[sea_orm(num_value = 4)]
    CouldNotJoinZoomMeetingStatusFailed,
    #[sea_orm(num_value = 5)]
    CouldNotJoinUnpublishedZoomApp,
    #[sea_orm(num_value = 6)]
    FatalErrorRtmpConnectionFailed,
    #[sea_orm(num_value = 7)]
    CouldNotJoinZoomSdkInternalError,
    #[sea_orm(num_value = 8)]
    FatalErrorUiElementNotFound,
    #[sea_orm(num_value = 9)]
    CouldNotJoinRequestToJoinDenied,
    #[sea_orm(num_value = 10)]
    LeaveRequestedUserRequested,
    #[sea_orm(num_value = 11)]
    LeaveRequestedAutoLeaveSilence,
    #[sea_orm(num_value = 12)]
    LeaveRequestedAutoLeaveOnlyParticipantInMeeting,
    #[sea_orm(num_value = 13)]
    FatalErrorHeartbeatTimeout,
    #[sea_orm(num_value = 14)]
    CouldNotJoinMeetingNotFound,
    #[sea_orm(num_value = 15)]
    FatalErrorBotNotLaunched,
    #[sea_orm(num_value = 16)]
    CouldNotJoinWaitingRoomTimeoutExceeded,
    #[sea_orm(num_value = 17)]
    LeaveRequestedAutoLeaveMaxUptimeExceeded,
    #[sea_orm(num_value = 18)]
    CouldNotJoinLoginRequired,
    #[sea_orm(num_value = 19)]
    CouldNotJoinBotLoginAttemptFailed,
    #[sea_orm(num_value = 20)]
    FatalErrorOutOfCredits,
    #[sea_orm(num_value = 21)]
    CouldNotJoinUnableToConnectToMeeting,
    #[sea_orm(num_value = 22)]
    FatalErrorInternalError,
    #[sea_orm(num_value = 23)]
    RecordingPermissionDeniedHostDeniedPermission,
    #[sea_orm(num_value = 24)]
    RecordingPermissionDeniedRequestTimedOut,
    #[sea_orm(num_value = 25)]
    RecordingPermissionDeniedHostClientCannotGrantPermission,
    #[sea_orm(num_value = 26)]
    LeaveRequestedAutoLeaveCouldNotEnableClosedCaptions,
    #[sea_orm(num_value = 27)]
    CouldNotJoinAuthorizedUserNotInMeetingTimeoutExceeded,
}

impl BotEventSubKind {
    pub fn api_code(&self) -> &'static str {
        match self {
            BotEventSubKind::CouldNotJoinMeetingNotStartedWaitingForHost => {
                "meeting_not_started_waiting_for_host"
            }
            BotEventSubKind::FatalErrorProcessTerminated => "process_terminated",
            BotEventSubKind::CouldNotJoinZoomAuthorizationFailed => "zoom_authorization_failed",
            BotEventSubKind::CouldNotJoinZoomMeetingStatusFailed => "zoom_meeting_status_failed",
            BotEventSubKind::CouldNotJoinUnpublishedZoomApp => "unpublished_zoom_app",
            BotEventSubKind::FatalErrorRtmpConnectionFailed => "rtmp_connection_failed",
            BotEventSubKind::CouldNotJoinZoomSdkInternalError => "zoom_sdk_internal_error",
            BotEventSubKind::FatalErrorUiElementNotFound => "ui_element_not_found",
            BotEventSubKind::CouldNotJoinRequestToJoinDenied => "request_to_join_denied",
            BotEventSubKind::LeaveRequestedUserRequested => "user_requested",
            BotEventSubKind::LeaveRequestedAutoLeaveSilence => "auto_leave_silence",
            BotEventSubKind::LeaveRequestedAutoLeaveOnlyParticipantInMeeting => {
                "auto_leave_only_participant_in_meeting"
            }
            BotEventSubKind::FatalErrorHeartbeatTimeout => "heartbeat_timeout",
            BotEventSubKind::CouldNotJoinMeetingNotFound => "meeting_not_found",
            BotEventSubKind::FatalErrorBotNotLaunched => "bot_not_launched",
            BotEventSubKind::CouldNotJoinWaitingRoomTimeoutExceeded => {
                "waiting_room_timeout_exceeded"
            }
            BotEventSubKind::LeaveRequestedAutoLeaveMaxUptimeExceeded => {
                "auto_leave_max_uptime_exceeded"
            }
            BotEventSubKind::CouldNotJoinLoginRequired => "login_required",
            BotEventSubKind::CouldNotJoinBotLoginAttemptFailed => "bot_login_attempt_failed",
            BotEventSubKind::FatalErrorOutOfCredits => "out_of_credits",
            BotEventSubKind::CouldNotJoinUnableToConnectToMeeting => "unable_to_connect_to_meeting",
            BotEventSubKind::FatalErrorInternalError => "attendee_internal_error",
            BotEventSubKind::RecordingPermissionDeniedHostDeniedPermission => {
                "host_denied_permission"
            }
            BotEventSubKind::RecordingPermissionDeniedRequestTimedOut => "request_timed_out",
            BotEventSubKind::RecordingPermissionDeniedHostClientCannotGrantPermission => {
                "host_client_cannot_grant_permission"
            }
            BotEventSubKind::LeaveRequestedAutoLeaveCouldNotEnableClosedCaptions => {
                "auto_leave_could_not_enable_closed_captions"
            }
            BotEventSubKind::CouldNotJoinAuthorizedUserNotInMeetingTimeoutExceeded => {
                "authorized_user_not_in_meeting_timeout_exceeded"
            }
        }
    }

    /// Subkinds permitted for `FATAL_ERROR` events.
    pub fn fatal_error_subkinds() -> &'static [BotEventSubKind] {
        &[
            BotEventSubKind::FatalErrorProcessTerminated,
            BotEventSubKind::FatalErrorInternalError,
            BotEventSubKind::FatalErrorOutOfCredits,
            BotEventSubKind::FatalErrorRtmpConnectionFailed,
            BotEventSubKind::FatalErrorUiElementNotFound,
            BotEventSubKind::FatalErrorHeartbeatTimeout,
            BotEventSubKind::FatalErrorBotNotLaunched,
        ]
    }

    /// Subkinds permitted for `COULD_NOT_JOIN` events.
    pub fn could_not_join_subkinds() -> &'static [BotEventSubKind] {
        &[
            BotEventSubKind::CouldNotJoinMeetingNotStartedWaitingForHost,
            BotEventSubKind::CouldNotJoinUnableToConnectToMeeting,
            BotEventSubKind::CouldNotJoinWaitingRoomTimeoutExceeded,
            BotEventSubKind::CouldNotJoinZoomAuthorizationFailed,
            BotEventSubKind::CouldNotJoinLoginRequired,
            BotEventSubKind::CouldNotJoinAuthorizedUserNotInMeetingTimeoutExceeded,
            BotEventSubKind::CouldNotJoinBotLoginAttemptFailed,
            BotEventSubKind::CouldNotJoinZoomMeetingStatusFailed,
            BotEventSubKind::CouldNotJoinUnpublishedZoomApp,
            BotEventSubKind::CouldNotJoinZoomSdkInternalError,
            BotEventSubKind::CouldNotJoinRequestToJoinDenied,
            BotEventSubKind::CouldNotJoinMeetingNotFound,
        ]
    }

    /// Subkinds permitted for `LEAVE_REQUESTED` events. A null subkind is also
    /// accepted on this event kind for backwards compatibility.
    pub fn leave_requested_subkinds() -> &'static [BotEventSubKind] {
        &[
            BotEventSubKind::LeaveRequestedUserRequested,
            BotEventSubKind::LeaveRequestedAutoLeaveSilence,
            BotEventSubKind::LeaveRequestedAutoLeaveOnlyParticipantInMeeting,
            BotEventSubKind::LeaveRequestedAutoLeaveMaxUptimeExceeded,
            BotEventSubKind::LeaveRequestedAutoLeaveCouldNotEnableClosedCaptions,
        ]
    }

    /// Subkinds permitted for `BOT_RECORDING_PERMISSION_DENIED` events.
    pub fn recording_permission_denied_subkinds() -> &'static [BotEventSubKind] {
        &[
            BotEventSubKind::RecordingPermissionDeniedHostDeniedPermission,
            BotEventSubKind::RecordingPermissionDeniedRequestTimedOut,
            BotEventSubKind::RecordingPermissionDeniedHostClientCannotGrantPermission,
        ]
    }
}

/// Whether an event kind/subkind pair is an allowed combination.
///
/// `FATAL_ERROR`, `COULD_NOT_JOIN` and `BOT_RECORDING_PERMISSION_DENIED`
/// require a subkind from their permitted set. `LEAVE_REQUESTED` accepts its
/// set or null. Every other event kind requires a null subkind.
pub fn combination_is_valid(kind: BotEventKind, subkind: Option<BotEventSubKind>) -> bool {
    match kind {
        BotEventKind::FatalError => {
            subkind.is_some_and(|s| BotEventSubKind::fatal_error_subkinds().contains(&s))
        }
        BotEventKind::CouldNotJoin => {
            subkind.is_some_and(|s| BotEventSubKind::could_not_join_subkinds().contains(&s))
        }
        BotEventKind::LeaveRequested => match subkind {
            None => true,
            Some(s) => BotEventSubKind::leave_requested_subkinds().contains(&s),
        },
        BotEventKind::BotRecordingPermissionDenied => subkind
            .is_some_and(|s| BotEventSubKind::recording_permission_denied_subkinds().contains(&s)),
        _ => subkind.is_none(),
    }
}

impl std::fmt::Display for BotEventSubKind {
    fn fmt(&self, fmt: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(fmt, "{}", self.api_code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fatal_error_requires_a_fatal_subkind() {
        assert!(combination_is_valid(
            BotEventKind::FatalError,
            Some(BotEventSubKind::FatalErrorHeartbeatTimeout)
        ));
        assert!(!combination_is_valid(BotEventKind::FatalError, None));
        assert!(!combination_is_valid(
            BotEventKind::FatalError,
            Some(BotEventSubKind::CouldNotJoinMeetingNotFound)
        ));
    }

    #[test]
    fn leave_requested_accepts_null_subkind() {
        assert!(combination_is_valid(BotEventKind::LeaveRequested, None));
        assert!(combination_is_valid(
            BotEventKind::LeaveRequested,
            Some(BotEventSubKind::LeaveRequestedAutoLeaveSilence)
        ));
        assert!(!combination_is_valid(
            BotEventKind::LeaveRequested,
            Some(BotEventSubKind::FatalErrorOutOfCredits)
        ));
    }

    #[test]
    fn plain_events_reject_any_subkind() {
        assert!(combination_is_valid(BotEventKind::JoinRequested, None));
        assert!(!combination_is_valid(
            BotEventKind::JoinRequested,
            Some(BotEventSubKind::LeaveRequestedUserRequested)
        ));
    }
}

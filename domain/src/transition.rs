//! The bot state machine's transition table.
//!
//! Each event kind maps to the states it may fire from and the state it lands
//! in. For the breakout-room re-entry events the target depends on history,
//! so the target is a tagged variant resolved against the bot's last event.

use entity::bot_event_kind::BotEventKind;
use entity::bot_events;
use entity::bot_state::BotState;

use crate::error::{EngineErrorKind, Error};

/// Where a transition lands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionTarget {
    /// A fixed target state.
    Constant(BotState),
    /// The `old_state` of the bot's last event, which must be one of the
    /// breakout-room departure events leaving a joined state.
    FromLastEvent,
}

/// One row of the transition table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub valid_from: &'static [BotState],
    pub to: TransitionTarget,
}

use BotState::*;
use TransitionTarget::{Constant, FromLastEvent};

/// The complete transition table. Returns None only if an event kind has no
/// transition defined, which is a programmer error surfaced as
/// `UndefinedEventKind` by the engine.
pub fn transition_for(event_kind: BotEventKind) -> Option<Transition> {
    let transition = match event_kind {
        BotEventKind::JoinRequested => Transition {
            valid_from: &[Ready, Staged],
            to: Constant(Joining),
        },
        BotEventKind::Staged => Transition {
            valid_from: &[Scheduled],
            to: Constant(Staged),
        },
        BotEventKind::CouldNotJoin => Transition {
            valid_from: &[Joining, WaitingRoom],
            to: Constant(FatalError),
        },
        BotEventKind::FatalError => Transition {
            valid_from: &[
                Joining,
                JoinedRecordingPaused,
                JoinedRecording,
                JoinedNotRecording,
                JoinedRecordingPermissionDenied,
                WaitingRoom,
                Leaving,
                PostProcessing,
                Staged,
                Scheduled,
                JoiningBreakoutRoom,
                LeavingBreakoutRoom,
                Connecting,
                Disconnecting,
                Connected,
            ],
            to: Constant(FatalError),
        },
        BotEventKind::BotPutInWaitingRoom => Transition {
            valid_from: &[Joining],
            to: Constant(WaitingRoom),
        },
        BotEventKind::BotJoinedMeeting => Transition {
            valid_from: &[WaitingRoom, Joining],
            to: Constant(JoinedNotRecording),
        },
        BotEventKind::BotRecordingPermissionGranted => Transition {
            valid_from: &[JoinedNotRecording, JoinedRecordingPermissionDenied],
            to: Constant(JoinedRecording),
        },
        BotEventKind::MeetingEnded => Transition {
            valid_from: &[
                JoinedRecordingPaused,
                JoinedRecording,
                JoinedNotRecording,
                JoinedRecordingPermissionDenied,
                WaitingRoom,
                Joining,
                Leaving,
                JoiningBreakoutRoom,
                LeavingBreakoutRoom,
            ],
            to: Constant(PostProcessing),
        },
        BotEventKind::LeaveRequested => Transition {
            valid_from: &[
                JoinedRecordingPaused,
                JoinedRecording,
                JoinedNotRecording,
                JoinedRecordingPermissionDenied,
                WaitingRoom,
                Joining,
                JoiningBreakoutRoom,
                LeavingBreakoutRoom,
            ],
            to: Constant(Leaving),
        },
        BotEventKind::BotLeftMeeting => Transition {
            valid_from: &[Leaving],
            to: Constant(PostProcessing),
        },
        BotEventKind::PostProcessingCompleted => Transition {
            valid_from: &[PostProcessing],
            to: Constant(Ended),
        },
        BotEventKind::DataDeleted => Transition {
            valid_from: &[FatalError, Ended],
            to: Constant(DataDeleted),
        },
        BotEventKind::RecordingPaused => Transition {
            valid_from: &[JoinedRecording],
            to: Constant(JoinedRecordingPaused),
        },
        BotEventKind::RecordingResumed => Transition {
            valid_from: &[JoinedRecordingPaused],
            to: Constant(JoinedRecording),
        },
        BotEventKind::BotJoinedBreakoutRoom => Transition {
            valid_from: &[JoiningBreakoutRoom],
            // The target depends on which joined state the bot left, so it is
            // resolved from the last event instead of being a constant.
            to: FromLastEvent,
        },
        BotEventKind::BotLeftBreakoutRoom => Transition {
            valid_from: &[LeavingBreakoutRoom],
            to: FromLastEvent,
        },
        BotEventKind::BotBeganJoiningBreakoutRoom => Transition {
            valid_from: &[
                JoinedNotRecording,
                JoinedRecordingPermissionDenied,
                JoinedRecording,
                JoinedRecordingPaused,
            ],
            to: Constant(JoiningBreakoutRoom),
        },
        BotEventKind::BotBeganLeavingBreakoutRoom => Transition {
            valid_from: &[
                JoinedNotRecording,
                JoinedRecordingPermissionDenied,
                JoinedRecording,
                JoinedRecordingPaused,
            ],
            to: Constant(LeavingBreakoutRoom),
        },
        BotEventKind::BotRecordingPermissionDenied => Transition {
            valid_from: &[
                JoinedNotRecording,
                JoinedRecordingPermissionDenied,
                JoinedRecording,
                JoinedRecordingPaused,
            ],
            to: Constant(JoinedRecordingPermissionDenied),
        },
        // App session events
        BotEventKind::AppSessionConnectionRequested => Transition {
            valid_from: &[Ready],
            to: Constant(Connecting),
        },
        BotEventKind::AppSessionConnected => Transition {
            valid_from: &[Connecting],
            to: Constant(Connected),
        },
        BotEventKind::AppSessionDisconnectRequested => Transition {
            valid_from: &[Connected, Connecting],
            to: Constant(Disconnecting),
        },
        BotEventKind::AppSessionDisconnected => Transition {
            valid_from: &[Disconnecting],
            to: Constant(PostProcessing),
        },
    };
    Some(transition)
}

/// Whether an event of this kind may be created while the bot is in `state`.
pub fn event_can_be_created_for_state(event_kind: BotEventKind, state: BotState) -> bool {
    transition_for(event_kind).is_some_and(|transition| transition.valid_from.contains(&state))
}

/// The four states in which the bot is present in the meeting proper.
const JOINED_STATES: &[BotState] = &[
    JoinedRecording,
    JoinedNotRecording,
    JoinedRecordingPermissionDenied,
    JoinedRecordingPaused,
];

pub fn can_play_media(state: BotState) -> bool {
    JOINED_STATES.contains(&state)
}

pub fn can_admit_from_waiting_room(state: BotState) -> bool {
    JOINED_STATES.contains(&state)
}

pub fn can_update_transcription_settings(state: BotState) -> bool {
    JOINED_STATES.contains(&state)
}

pub fn can_change_gallery_view_page(state: BotState) -> bool {
    JOINED_STATES.contains(&state)
}

pub fn can_pause_recording(state: BotState) -> bool {
    event_can_be_created_for_state(BotEventKind::RecordingPaused, state)
}

pub fn can_resume_recording(state: BotState) -> bool {
    event_can_be_created_for_state(BotEventKind::RecordingResumed, state)
}

/// Resolves a `FromLastEvent` target against the bot's last event: the event
/// must be one of the began-joining/began-leaving breakout events, and its
/// `old_state` (the joined state the bot came from) becomes the target.
pub fn resolve_from_last_event(last_event: Option<&bot_events::Model>) -> Result<BotState, Error> {
    let Some(last_event) = last_event else {
        return Err(Error::engine(EngineErrorKind::InvariantViolation(
            "Breakout room transition requires a prior event, but the bot has none".to_string(),
        )));
    };

    if !matches!(
        last_event.event_kind,
        BotEventKind::BotBeganJoiningBreakoutRoom | BotEventKind::BotBeganLeavingBreakoutRoom
    ) {
        return Err(Error::engine(EngineErrorKind::InvariantViolation(format!(
            "Unexpected event kind for last bot event: {}",
            last_event.event_kind
        ))));
    }

    if !JOINED_STATES.contains(&last_event.old_state) {
        return Err(Error::engine(EngineErrorKind::InvariantViolation(format!(
            "Unexpected from-state for last bot event: {}",
            last_event.old_state
        ))));
    }

    Ok(last_event.old_state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use entity::Id;
    use sea_orm::Iterable;

    fn breakout_departure_event(
        event_kind: BotEventKind,
        old_state: BotState,
        new_state: BotState,
    ) -> bot_events::Model {
        let now = chrono::Utc::now();
        bot_events::Model {
            id: Id::new_v4(),
            bot_id: Id::new_v4(),
            old_state,
            new_state,
            event_kind,
            event_subkind: None,
            metadata: serde_json::json!({}),
            requested_action_taken_at: None,
            created_at: now.into(),
        }
    }

    #[test]
    fn every_event_kind_has_a_transition() {
        for event_kind in BotEventKind::iter() {
            assert!(
                transition_for(event_kind).is_some(),
                "missing transition for {event_kind}"
            );
        }
    }

    #[test]
    fn join_requested_moves_ready_to_joining() {
        let transition = transition_for(BotEventKind::JoinRequested).unwrap();
        assert!(transition.valid_from.contains(&Ready));
        assert!(transition.valid_from.contains(&Staged));
        assert_eq!(transition.to, Constant(Joining));
    }

    #[test]
    fn data_deleted_only_from_terminal_states() {
        let transition = transition_for(BotEventKind::DataDeleted).unwrap();
        assert_eq!(transition.valid_from, &[FatalError, Ended]);
        assert!(!event_can_be_created_for_state(
            BotEventKind::DataDeleted,
            DataDeleted
        ));
    }

    #[test]
    fn fatal_error_cannot_fire_from_terminal_states() {
        for state in [FatalError, Ended, DataDeleted, Ready] {
            assert!(
                !event_can_be_created_for_state(BotEventKind::FatalError, state),
                "fatal_error should not fire from {state}"
            );
        }
        // But it is reachable from terminal-adjacent states by design.
        for state in [PostProcessing, Staged, Scheduled] {
            assert!(event_can_be_created_for_state(BotEventKind::FatalError, state));
        }
    }

    #[test]
    fn post_processing_completed_only_from_post_processing() {
        let transition = transition_for(BotEventKind::PostProcessingCompleted).unwrap();
        assert_eq!(transition.valid_from, &[PostProcessing]);
        assert_eq!(transition.to, Constant(Ended));
    }

    #[test]
    fn breakout_reentry_resolves_to_the_departed_state() {
        for joined_state in [
            JoinedRecording,
            JoinedNotRecording,
            JoinedRecordingPermissionDenied,
            JoinedRecordingPaused,
        ] {
            let last_event = breakout_departure_event(
                BotEventKind::BotBeganJoiningBreakoutRoom,
                joined_state,
                JoiningBreakoutRoom,
            );
            assert_eq!(
                resolve_from_last_event(Some(&last_event)).unwrap(),
                joined_state
            );
        }
    }

    #[test]
    fn breakout_reentry_rejects_unexpected_last_events() {
        let last_event =
            breakout_departure_event(BotEventKind::BotJoinedMeeting, Joining, JoinedNotRecording);
        assert!(resolve_from_last_event(Some(&last_event)).is_err());
        assert!(resolve_from_last_event(None).is_err());

        // A departure event that somehow left a non-joined state is rejected too.
        let bad_state = breakout_departure_event(
            BotEventKind::BotBeganJoiningBreakoutRoom,
            WaitingRoom,
            JoiningBreakoutRoom,
        );
        assert!(resolve_from_last_event(Some(&bad_state)).is_err());
    }

    #[test]
    fn pause_and_resume_predicates_follow_the_table() {
        assert!(can_pause_recording(JoinedRecording));
        assert!(!can_pause_recording(JoinedRecordingPaused));
        assert!(can_resume_recording(JoinedRecordingPaused));
        assert!(!can_resume_recording(JoinedRecording));
    }

    #[test]
    fn media_predicates_hold_on_all_joined_states() {
        for state in [
            JoinedRecording,
            JoinedNotRecording,
            JoinedRecordingPermissionDenied,
            JoinedRecordingPaused,
        ] {
            assert!(can_play_media(state));
            assert!(can_admit_from_waiting_room(state));
            assert!(can_update_transcription_settings(state));
            assert!(can_change_gallery_view_page(state));
        }
        assert!(!can_play_media(WaitingRoom));
        assert!(!can_admit_from_waiting_room(Joining));
    }
}

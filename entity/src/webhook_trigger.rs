use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Events a webhook subscription can be notified about.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[sea_orm(rs_type = "i32", db_type = "Integer")]
pub enum WebhookTrigger {
    #[sea_orm(num_value = 1)]
    #[default]
    BotStateChange,
    #[sea_orm(num_value = 2)]
    TranscriptUpdate,
    #[sea_orm(num_value = 3)]
    ChatMessagesUpdate,
    #[sea_orm(num_value = 4)]
    ParticipantEventsJoinLeave,
    #[sea_orm(num_value = 5)]
    CalendarEventsUpdate,
    #[sea_orm(num_value = 6)]
    CalendarStateChange,
    #[sea_orm(num_value = 7)]
    AsyncTranscriptionStateChange,
    #[sea_orm(num_value = 8)]
    ZoomOauthConnectionStateChange,
    #[sea_orm(num_value = 9)]
    BotLogsUpdate,
    #[sea_orm(num_value = 10)]
    ParticipantEventsAll,
}

impl WebhookTrigger {
    pub fn api_code(&self) -> &'static str {
        match self {
            WebhookTrigger::BotStateChange => "bot.state_change",
            WebhookTrigger::TranscriptUpdate => "transcript.update",
            WebhookTrigger::ChatMessagesUpdate => "chat_messages.update",
            WebhookTrigger::ParticipantEventsJoinLeave => "participant_events.join_leave",
            WebhookTrigger::CalendarEventsUpdate => "calendar.events_update",
            WebhookTrigger::CalendarStateChange => "calendar.state_change",
            WebhookTrigger::AsyncTranscriptionStateChange => "async_transcription.state_change",
            WebhookTrigger::ZoomOauthConnectionStateChange => "zoom_oauth_connection.state_change",
            WebhookTrigger::BotLogsUpdate => "bot_logs.update",
            WebhookTrigger::ParticipantEventsAll => "participant_events.all",
        }
    }

    pub fn from_api_code(api_code: &str) -> Option<Self> {
        use sea_orm::Iterable;
        WebhookTrigger::iter().find(|trigger| trigger.api_code() == api_code)
    }

    /// The numeric code persisted in subscription trigger lists.
    pub fn as_i32(&self) -> i32 {
        use sea_orm::ActiveEnum;
        self.to_value()
    }
}

impl std::fmt::Display for WebhookTrigger {
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
        for trigger in WebhookTrigger::iter() {
            assert_eq!(
                WebhookTrigger::from_api_code(trigger.api_code()),
                Some(trigger)
            );
        }
    }
}

//! SeaORM Entity for the bots table.
//!
//! A bot is one session in one meeting. Its `state` only moves through the
//! transitions defined in the domain layer, and every durable write bumps
//! `version` so that concurrent writers can detect each other.

use crate::bot_state::BotState;
use crate::session_kind::SessionKind;
use crate::Id;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Assumed runtime when the first and last heartbeat are the same tick.
pub const MIN_BILLABLE_SECONDS: i64 = 30;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(schema_name = "meetbot", table_name = "bots")]
pub struct Model {
    #[serde(skip_deserializing)]
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Id,

    #[sea_orm(unique)]
    pub object_id: String,

    pub project_id: Id,

    pub name: String,

    pub meeting_url: String,

    pub state: BotState,

    /// Opaque per-bot configuration (recording, transcription, auto-leave...).
    #[sea_orm(column_type = "JsonBinary")]
    pub settings: Json,

    /// Caller-supplied metadata, echoed back on API reads.
    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub metadata: Option<Json>,

    /// Epoch seconds of the first heartbeat received from the bot process.
    pub first_heartbeat_timestamp: Option<i64>,

    /// Epoch seconds of the most recent heartbeat.
    pub last_heartbeat_timestamp: Option<i64>,

    /// When a scheduled bot should join its meeting.
    pub join_at: Option<DateTimeWithTimeZone>,

    /// Optional key for deduplicating bots within a project. At most one
    /// non-post-meeting bot per (project, key).
    pub deduplication_key: Option<String>,

    pub session_kind: SessionKind,

    /// Optimistic concurrency counter; stale writes are rejected.
    #[serde(skip_deserializing)]
    pub version: i32,

    #[serde(skip_deserializing)]
    pub created_at: DateTimeWithTimeZone,

    #[serde(skip_deserializing)]
    pub updated_at: DateTimeWithTimeZone,
}

impl Model {
    /// The `object_id` prefix for this session kind.
    pub fn object_id_prefix(&self) -> &'static str {
        match self.session_kind {
            SessionKind::Bot => "bot_",
            SessionKind::AppSession => "app_",
        }
    }

    /// Seconds the bot was active, derived from its heartbeats.
    ///
    /// Zero if either heartbeat is missing or they are out of order. If first
    /// and last are the same tick the exact runtime is unknown and a 30 second
    /// floor is assumed.
    pub fn duration_seconds(&self) -> i64 {
        let (Some(first), Some(last)) =
            (self.first_heartbeat_timestamp, self.last_heartbeat_timestamp)
        else {
            return 0;
        };
        if last < first {
            return 0;
        }
        if last == first {
            return MIN_BILLABLE_SECONDS;
        }
        last - first
    }

    /// Centicredits this bot's runtime costs at 1 credit per hour, rounded up.
    pub fn centicredits_consumed(&self) -> i32 {
        let seconds_active = self.duration_seconds();
        if seconds_active == 0 {
            return 0;
        }
        let hours_active = seconds_active as f64 / 3600.0;
        (hours_active * 100.0).ceil() as i32
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::projects::Entity",
        from = "Column::ProjectId",
        to = "super::projects::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Projects,

    #[sea_orm(has_many = "super::bot_events::Entity")]
    BotEvents,

    #[sea_orm(has_many = "super::recordings::Entity")]
    Recordings,

    #[sea_orm(has_many = "super::participants::Entity")]
    Participants,

    #[sea_orm(has_many = "super::chat_messages::Entity")]
    ChatMessages,

    #[sea_orm(has_many = "super::bot_resource_snapshots::Entity")]
    BotResourceSnapshots,

    #[sea_orm(has_many = "super::webhook_delivery_attempts::Entity")]
    WebhookDeliveryAttempts,
}

impl Related<super::projects::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Projects.def()
    }
}

impl Related<super::bot_events::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BotEvents.def()
    }
}

impl Related<super::recordings::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Recordings.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn bot_with_heartbeats(first: Option<i64>, last: Option<i64>) -> Model {
        let now = Utc::now();
        Model {
            id: Id::new_v4(),
            object_id: "bot_0123456789abcdef".to_owned(),
            project_id: Id::new_v4(),
            name: "My bot".to_owned(),
            meeting_url: "https://meet.example.com/abc-defg-hij".to_owned(),
            state: BotState::Ready,
            settings: serde_json::json!({}),
            metadata: None,
            first_heartbeat_timestamp: first,
            last_heartbeat_timestamp: last,
            join_at: None,
            deduplication_key: None,
            session_kind: SessionKind::Bot,
            version: 0,
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    #[test]
    fn duration_is_zero_without_heartbeats() {
        assert_eq!(bot_with_heartbeats(None, None).duration_seconds(), 0);
        assert_eq!(bot_with_heartbeats(Some(1000), None).duration_seconds(), 0);
        assert_eq!(bot_with_heartbeats(None, Some(1000)).duration_seconds(), 0);
    }

    #[test]
    fn duration_is_zero_when_heartbeats_are_out_of_order() {
        assert_eq!(
            bot_with_heartbeats(Some(2000), Some(1000)).duration_seconds(),
            0
        );
    }

    #[test]
    fn duration_floors_to_thirty_seconds_when_heartbeats_are_equal() {
        assert_eq!(
            bot_with_heartbeats(Some(1000), Some(1000)).duration_seconds(),
            MIN_BILLABLE_SECONDS
        );
    }

    #[test]
    fn one_hour_costs_one_credit() {
        let bot = bot_with_heartbeats(Some(1000), Some(4600));
        assert_eq!(bot.duration_seconds(), 3600);
        assert_eq!(bot.centicredits_consumed(), 100);
    }

    #[test]
    fn partial_hours_round_up() {
        // 30 minutes is half a credit
        assert_eq!(
            bot_with_heartbeats(Some(0), Some(1800)).centicredits_consumed(),
            50
        );
        // a single second still rounds up to one centicredit
        assert_eq!(
            bot_with_heartbeats(Some(0), Some(1)).centicredits_consumed(),
            1
        );
    }

    #[test]
    fn app_sessions_use_the_app_prefix() {
        let mut bot = bot_with_heartbeats(None, None);
        assert_eq!(bot.object_id_prefix(), "bot_");
        bot.session_kind = SessionKind::AppSession;
        assert_eq!(bot.object_id_prefix(), "app_");
    }
}

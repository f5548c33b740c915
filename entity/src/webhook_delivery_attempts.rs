//! SeaORM Entity for the webhook_delivery_attempts table.
//!
//! One row per (subscription, emitted event). The delivery worker retries the
//! POST with exponential backoff, appending each response body to
//! `response_body_list` until it succeeds or exhausts its attempts.

use crate::webhook_delivery_status::WebhookDeliveryStatus;
use crate::webhook_trigger::WebhookTrigger;
use crate::Id;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(schema_name = "meetbot", table_name = "webhook_delivery_attempts")]
pub struct Model {
    #[serde(skip_deserializing)]
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Id,

    pub webhook_subscription_id: Id,

    pub webhook_trigger: WebhookTrigger,

    /// Receivers may dedupe on this; unique across all attempts.
    #[sea_orm(unique)]
    pub idempotency_key: Uuid,

    pub bot_id: Option<Id>,

    #[sea_orm(column_type = "JsonBinary")]
    pub payload: Json,

    pub status: WebhookDeliveryStatus,

    pub attempt_count: i32,

    pub last_attempt_at: Option<DateTimeWithTimeZone>,

    pub succeeded_at: Option<DateTimeWithTimeZone>,

    /// Response bodies from each attempt, in order.
    #[sea_orm(column_type = "JsonBinary")]
    pub response_body_list: Json,

    #[serde(skip_deserializing)]
    pub created_at: DateTimeWithTimeZone,

    #[serde(skip_deserializing)]
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::webhook_subscriptions::Entity",
        from = "Column::WebhookSubscriptionId",
        to = "super::webhook_subscriptions::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    WebhookSubscriptions,

    #[sea_orm(
        belongs_to = "super::bots::Entity",
        from = "Column::BotId",
        to = "super::bots::Column::Id",
        on_update = "NoAction",
        on_delete = "SetNull"
    )]
    Bots,
}

impl Related<super::webhook_subscriptions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::WebhookSubscriptions.def()
    }
}

impl Related<super::bots::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Bots.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

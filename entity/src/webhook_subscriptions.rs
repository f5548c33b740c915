//! SeaORM Entity for the webhook_subscriptions table.
//! Binds a destination URL to a project, optionally narrowed to one bot.

use crate::Id;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

pub const OBJECT_ID_PREFIX: &str = "webhook_";

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(schema_name = "meetbot", table_name = "webhook_subscriptions")]
pub struct Model {
    #[serde(skip_deserializing)]
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Id,

    #[sea_orm(unique)]
    pub object_id: String,

    pub project_id: Id,

    /// When set, the subscription only fires for this bot.
    pub bot_id: Option<Id>,

    pub url: String,

    /// Enabled trigger kinds as an array of their numeric codes.
    #[sea_orm(column_type = "JsonBinary")]
    pub triggers: Json,

    pub is_active: bool,

    #[serde(skip_deserializing)]
    pub created_at: DateTimeWithTimeZone,

    #[serde(skip_deserializing)]
    pub updated_at: DateTimeWithTimeZone,
}

impl Model {
    /// Whether this subscription listens to the given trigger's numeric code.
    pub fn has_trigger(&self, trigger_code: i32) -> bool {
        self.triggers
            .as_array()
            .is_some_and(|codes| codes.iter().any(|code| code.as_i64() == Some(trigger_code as i64)))
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::projects::Entity",
        from = "Column::ProjectId",
        to = "super::projects::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Projects,

    #[sea_orm(
        belongs_to = "super::bots::Entity",
        from = "Column::BotId",
        to = "super::bots::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Bots,

    #[sea_orm(has_many = "super::webhook_delivery_attempts::Entity")]
    WebhookDeliveryAttempts,
}

impl Related<super::projects::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Projects.def()
    }
}

impl Related<super::webhook_delivery_attempts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::WebhookDeliveryAttempts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn has_trigger_checks_the_numeric_code_list() {
        let now = Utc::now();
        let subscription = Model {
            id: Id::new_v4(),
            object_id: "webhook_0123456789abcdef".to_owned(),
            project_id: Id::new_v4(),
            bot_id: None,
            url: "https://example.com/hooks".to_owned(),
            triggers: serde_json::json!([1, 7]),
            is_active: true,
            created_at: now.into(),
            updated_at: now.into(),
        };

        assert!(subscription.has_trigger(1));
        assert!(subscription.has_trigger(7));
        assert!(!subscription.has_trigger(2));
    }
}

//! SeaORM Entity for the projects table.

use crate::Id;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

pub const OBJECT_ID_PREFIX: &str = "proj_";

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(schema_name = "meetbot", table_name = "projects")]
pub struct Model {
    #[serde(skip_deserializing)]
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Id,

    #[sea_orm(unique)]
    pub object_id: String,

    pub organization_id: Id,

    pub name: String,

    #[serde(skip_deserializing)]
    pub created_at: DateTimeWithTimeZone,

    #[serde(skip_deserializing)]
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::organizations::Entity",
        from = "Column::OrganizationId",
        to = "super::organizations::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Organizations,

    #[sea_orm(has_many = "super::bots::Entity")]
    Bots,

    #[sea_orm(has_many = "super::webhook_subscriptions::Entity")]
    WebhookSubscriptions,

    #[sea_orm(has_many = "super::webhook_secrets::Entity")]
    WebhookSecrets,

    #[sea_orm(has_many = "super::credentials::Entity")]
    Credentials,
}

impl Related<super::organizations::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Organizations.def()
    }
}

impl Related<super::bots::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Bots.def()
    }
}

impl Related<super::webhook_subscriptions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::WebhookSubscriptions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

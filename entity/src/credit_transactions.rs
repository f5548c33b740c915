//! SeaORM Entity for the credit_transactions table.
//!
//! Transactions form a per-organization linked list. Partial unique indexes
//! guarantee a single root (null parent) and a single child per parent, which
//! makes the chain linear and the leaf's `centicredits_after` the balance.
//! Rows never mutate after creation.

use crate::Id;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(schema_name = "meetbot", table_name = "credit_transactions")]
pub struct Model {
    #[serde(skip_deserializing)]
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Id,

    pub organization_id: Id,

    pub centicredits_before: i32,

    pub centicredits_after: i32,

    pub centicredits_delta: i32,

    pub parent_transaction_id: Option<Id>,

    /// Set when the transaction was caused by a bot's usage.
    pub bot_id: Option<Id>,

    /// Set when the transaction was caused by a purchase.
    pub stripe_payment_intent_id: Option<String>,

    pub description: Option<String>,

    #[serde(skip_deserializing)]
    pub created_at: DateTimeWithTimeZone,
}

impl Model {
    pub fn credits_delta(&self) -> f64 {
        self.centicredits_delta as f64 / 100.0
    }

    pub fn credits_after(&self) -> f64 {
        self.centicredits_after as f64 / 100.0
    }

    pub fn credits_before(&self) -> f64 {
        self.centicredits_before as f64 / 100.0
    }
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

    #[sea_orm(
        belongs_to = "Entity",
        from = "Column::ParentTransactionId",
        to = "Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    ParentTransaction,

    #[sea_orm(
        belongs_to = "super::bots::Entity",
        from = "Column::BotId",
        to = "super::bots::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Bots,
}

impl Related<super::organizations::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Organizations.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

//! Operations for the credit_transactions table.
//!
//! The table is append-only. Linearity of the per-organization chain is
//! enforced by partial unique indexes, not by application code; the queries
//! here only locate chain positions.

use super::error::Error;
use entity::credit_transactions::{ActiveModel, Column, Entity, Model};
use entity::Id;
use log::*;
use sea_orm::{
    entity::prelude::*,
    sea_query::{Expr, Query},
    ActiveValue::Set,
    ConnectionTrait,
};

pub async fn create<C>(db: &C, model: Model) -> Result<Model, Error>
where
    C: ConnectionTrait,
{
    debug!(
        "Appending credit transaction for organization {}: delta {}",
        model.organization_id, model.centicredits_delta
    );

    let now = chrono::Utc::now();

    let active_model = ActiveModel {
        id: Set(Id::new_v4()),
        organization_id: Set(model.organization_id),
        centicredits_before: Set(model.centicredits_before),
        centicredits_after: Set(model.centicredits_after),
        centicredits_delta: Set(model.centicredits_delta),
        parent_transaction_id: Set(model.parent_transaction_id),
        bot_id: Set(model.bot_id),
        stripe_payment_intent_id: Set(model.stripe_payment_intent_id),
        description: Set(model.description),
        created_at: Set(now.into()),
    };

    Ok(active_model.insert(db).await?)
}

/// The organization's leaf transaction: the one no other transaction names as
/// its parent. None when the organization has no transactions yet.
pub async fn find_leaf<C>(db: &C, organization_id: Id) -> Result<Option<Model>, Error>
where
    C: ConnectionTrait,
{
    let parent_ids = Query::select()
        .column(Column::ParentTransactionId)
        .from(Entity)
        .and_where(Expr::col(Column::OrganizationId).eq(organization_id))
        .and_where(Expr::col(Column::ParentTransactionId).is_not_null())
        .to_owned();

    Ok(Entity::find()
        .filter(Column::OrganizationId.eq(organization_id))
        .filter(Column::Id.not_in_subquery(parent_ids))
        .one(db)
        .await?)
}

pub async fn find_all_for_organization<C>(db: &C, organization_id: Id) -> Result<Vec<Model>, Error>
where
    C: ConnectionTrait,
{
    Ok(Entity::find()
        .filter(Column::OrganizationId.eq(organization_id))
        .all(db)
        .await?)
}

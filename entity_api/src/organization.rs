//! CRUD operations for the organizations table.

use super::error::Error;
use entity::organizations::{ActiveModel, Column, Entity, Model};
use entity::Id;
use log::*;
use sea_orm::{entity::prelude::*, sea_query::Expr, ActiveValue::Set, ConnectionTrait};

pub async fn create<C>(db: &C, model: Model) -> Result<Model, Error>
where
    C: ConnectionTrait,
{
    debug!("Creating new organization: {}", model.name);

    let now = chrono::Utc::now();

    let active_model = ActiveModel {
        id: Set(Id::new_v4()),
        name: Set(model.name),
        centicredits: Set(model.centicredits),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    };

    Ok(active_model.insert(db).await?)
}

pub async fn find_by_id<C>(db: &C, id: Id) -> Result<Model, Error>
where
    C: ConnectionTrait,
{
    Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(Error::record_not_found)
}

/// Sets the organization's balance to a freshly computed value. Only the
/// credit ledger calls this, inside its serialized transaction.
pub async fn update_centicredits<C>(db: &C, id: Id, centicredits: i32) -> Result<(), Error>
where
    C: ConnectionTrait,
{
    Entity::update_many()
        .col_expr(Column::Centicredits, Expr::value(centicredits))
        .col_expr(
            Column::UpdatedAt,
            Expr::value(DateTimeWithTimeZone::from(chrono::Utc::now())),
        )
        .filter(Column::Id.eq(id))
        .exec(db)
        .await?;
    Ok(())
}

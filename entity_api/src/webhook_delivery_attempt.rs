//! CRUD operations for the webhook_delivery_attempts table.

use super::error::Error;
use entity::webhook_delivery_attempts::{ActiveModel, Column, Entity, Model};
use entity::webhook_delivery_status::WebhookDeliveryStatus;
use entity::webhook_trigger::WebhookTrigger;
use entity::Id;
use log::*;
use sea_orm::{
    entity::prelude::*,
    ActiveValue::{Set, Unchanged},
    ConnectionTrait, QueryOrder, QuerySelect,
};

pub async fn create<C>(db: &C, model: Model) -> Result<Model, Error>
where
    C: ConnectionTrait,
{
    debug!(
        "Enqueuing webhook delivery attempt for subscription {} with key {}",
        model.webhook_subscription_id, model.idempotency_key
    );

    let now = chrono::Utc::now();

    let active_model = ActiveModel {
        id: Set(Id::new_v4()),
        webhook_subscription_id: Set(model.webhook_subscription_id),
        webhook_trigger: Set(model.webhook_trigger),
        idempotency_key: Set(model.idempotency_key),
        bot_id: Set(model.bot_id),
        payload: Set(model.payload),
        status: Set(WebhookDeliveryStatus::Pending),
        attempt_count: Set(0),
        last_attempt_at: Set(None),
        succeeded_at: Set(None),
        response_body_list: Set(serde_json::json!([])),
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

/// Pending attempts, oldest first, for the delivery worker to consider.
pub async fn find_pending<C>(db: &C, limit: u64) -> Result<Vec<Model>, Error>
where
    C: ConnectionTrait,
{
    Ok(Entity::find()
        .filter(Column::Status.eq(WebhookDeliveryStatus::Pending))
        .order_by_asc(Column::CreatedAt)
        .limit(limit)
        .all(db)
        .await?)
}

/// Persists the outcome of one delivery round for an attempt.
pub async fn update_after_attempt<C>(db: &C, model: Model) -> Result<Model, Error>
where
    C: ConnectionTrait,
{
    let active_model = ActiveModel {
        id: Unchanged(model.id),
        status: Set(model.status),
        attempt_count: Set(model.attempt_count),
        last_attempt_at: Set(model.last_attempt_at),
        succeeded_at: Set(model.succeeded_at),
        response_body_list: Set(model.response_body_list),
        updated_at: Set(chrono::Utc::now().into()),
        ..Default::default()
    };

    Ok(active_model.update(db).await?)
}

/// Purges a bot's delivery attempts whose payloads may carry meeting content.
/// Lifecycle (`bot.state_change`) attempts are retained for audit.
pub async fn delete_sensitive_for_bot<C>(db: &C, bot_id: Id) -> Result<u64, Error>
where
    C: ConnectionTrait,
{
    let result = Entity::delete_many()
        .filter(Column::BotId.eq(bot_id))
        .filter(Column::WebhookTrigger.ne(WebhookTrigger::BotStateChange))
        .exec(db)
        .await?;
    Ok(result.rows_affected)
}

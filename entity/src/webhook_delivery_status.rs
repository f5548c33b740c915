use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Terminal status of a webhook delivery attempt.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[sea_orm(rs_type = "i32", db_type = "Integer")]
pub enum WebhookDeliveryStatus {
    #[sea_orm(num_value = 1)]
    #[default]
    Pending,
    #[sea_orm(num_value = 2)]
    Success,
    #[sea_orm(num_value = 3)]
    Failure,
}

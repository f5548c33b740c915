use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Whether a session is a browser-driven bot or a media-API app session.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[sea_orm(rs_type = "i32", db_type = "Integer")]
pub enum SessionKind {
    #[sea_orm(num_value = 1)]
    #[default]
    Bot,
    #[sea_orm(num_value = 2)]
    AppSession,
}

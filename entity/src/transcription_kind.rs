use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// How a recording gets transcribed.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[sea_orm(rs_type = "i32", db_type = "Integer")]
pub enum TranscriptionKind {
    #[sea_orm(num_value = 1)]
    NonRealtime,
    #[sea_orm(num_value = 2)]
    Realtime,
    #[sea_orm(num_value = 3)]
    NoTranscription,
}

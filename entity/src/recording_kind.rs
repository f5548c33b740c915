use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// What media a recording captures.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[sea_orm(rs_type = "i32", db_type = "Integer")]
pub enum RecordingKind {
    #[sea_orm(num_value = 1)]
    AudioAndVideo,
    #[sea_orm(num_value = 2)]
    AudioOnly,
    #[sea_orm(num_value = 3)]
    NoRecording,
}

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Speech-to-text providers a recording can be transcribed with.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[sea_orm(rs_type = "i32", db_type = "Integer")]
pub enum TranscriptionProvider {
    #[sea_orm(num_value = 1)]
    Deepgram,
    #[sea_orm(num_value = 2)]
    ClosedCaptionFromPlatform,
    #[sea_orm(num_value = 3)]
    Gladia,
    #[sea_orm(num_value = 4)]
    OpenAi,
    #[sea_orm(num_value = 5)]
    AssemblyAi,
    #[sea_orm(num_value = 6)]
    Sarvam,
    #[sea_orm(num_value = 7)]
    ElevenLabs,
    #[sea_orm(num_value = 8)]
    Kyutai,
    #[sea_orm(num_value = 9)]
    CustomAsync,
}

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Which third-party service a credential blob belongs to.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[sea_orm(rs_type = "i32", db_type = "Integer")]
pub enum CredentialKind {
    #[sea_orm(num_value = 1)]
    Deepgram,
    #[sea_orm(num_value = 2)]
    ZoomOauth,
    #[sea_orm(num_value = 3)]
    GoogleTts,
    #[sea_orm(num_value = 4)]
    Gladia,
    #[sea_orm(num_value = 5)]
    OpenAi,
    #[sea_orm(num_value = 6)]
    AssemblyAi,
    #[sea_orm(num_value = 7)]
    Sarvam,
    #[sea_orm(num_value = 8)]
    TeamsBotLogin,
    #[sea_orm(num_value = 9)]
    ExternalMediaStorage,
    #[sea_orm(num_value = 10)]
    ElevenLabs,
    #[sea_orm(num_value = 11)]
    Kyutai,
}

//! Credential blob storage.
//!
//! Provider credentials are JSON documents, serialized and encrypted with the
//! process-wide key before they touch the database. Get and set roundtrip the
//! JSON exactly; a blob that fails to decrypt surfaces as a typed failure
//! rather than silently yielding garbage.

use entity::credential_kind::CredentialKind;
use entity::credentials;
use entity::Id;
use sea_orm::ConnectionTrait;
use service::config::Config;

use crate::encryption::CredentialCipher;
use crate::error::Error;
use entity_api::credential as credential_api;

/// Encrypts and stores a credential document for (project, kind), replacing
/// any previous document.
pub async fn set_credentials<C>(
    db: &C,
    config: &Config,
    project_id: Id,
    credential_kind: CredentialKind,
    credentials: &serde_json::Value,
) -> Result<credentials::Model, Error>
where
    C: ConnectionTrait,
{
    let cipher = cipher_from_config(config)?;
    let encrypted_data = cipher.encrypt_json(credentials)?;
    Ok(credential_api::upsert(db, project_id, credential_kind, encrypted_data).await?)
}

/// Decrypts and returns the credential document for (project, kind), or None
/// when no credentials are stored.
pub async fn get_credentials<C>(
    db: &C,
    config: &Config,
    project_id: Id,
    credential_kind: CredentialKind,
) -> Result<Option<serde_json::Value>, Error>
where
    C: ConnectionTrait,
{
    let Some(credential) =
        credential_api::find_by_project_and_kind(db, project_id, credential_kind).await?
    else {
        return Ok(None);
    };

    let Some(encrypted_data) = credential.encrypted_data.as_deref() else {
        return Ok(None);
    };

    let cipher = cipher_from_config(config)?;
    Ok(Some(cipher.decrypt_json(encrypted_data)?))
}

pub async fn delete_credentials<C>(
    db: &C,
    project_id: Id,
    credential_kind: CredentialKind,
) -> Result<(), Error>
where
    C: ConnectionTrait,
{
    Ok(credential_api::delete_by_project_and_kind(db, project_id, credential_kind).await?)
}

fn cipher_from_config(config: &Config) -> Result<CredentialCipher, Error> {
    let key_hex = config.credentials_encryption_key().ok_or_else(|| {
        Error::config("CREDENTIALS_ENCRYPTION_KEY is required for credential storage")
    })?;
    Ok(CredentialCipher::from_hex(&key_hex)?)
}

//! CRUD operations for the credentials table.

use super::error::Error;
use entity::credential_kind::CredentialKind;
use entity::credentials::{ActiveModel, Column, Entity, Model};
use entity::Id;
use log::*;
use sea_orm::{
    entity::prelude::*,
    ActiveValue::{Set, Unchanged},
    ConnectionTrait,
};

pub async fn find_by_project_and_kind<C>(
    db: &C,
    project_id: Id,
    credential_kind: CredentialKind,
) -> Result<Option<Model>, Error>
where
    C: ConnectionTrait,
{
    Ok(Entity::find()
        .filter(Column::ProjectId.eq(project_id))
        .filter(Column::CredentialKind.eq(credential_kind))
        .one(db)
        .await?)
}

/// Creates or replaces the encrypted blob for (project, kind).
pub async fn upsert<C>(
    db: &C,
    project_id: Id,
    credential_kind: CredentialKind,
    encrypted_data: String,
) -> Result<Model, Error>
where
    C: ConnectionTrait,
{
    let now = chrono::Utc::now();

    match find_by_project_and_kind(db, project_id, credential_kind).await? {
        Some(existing) => {
            debug!("Replacing {credential_kind:?} credentials for project {project_id}");
            let active_model = ActiveModel {
                id: Unchanged(existing.id),
                encrypted_data: Set(Some(encrypted_data)),
                updated_at: Set(now.into()),
                ..Default::default()
            };
            Ok(active_model.update(db).await?)
        }
        None => {
            debug!("Storing {credential_kind:?} credentials for project {project_id}");
            let active_model = ActiveModel {
                id: Set(Id::new_v4()),
                project_id: Set(project_id),
                credential_kind: Set(credential_kind),
                encrypted_data: Set(Some(encrypted_data)),
                created_at: Set(now.into()),
                updated_at: Set(now.into()),
            };
            Ok(active_model.insert(db).await?)
        }
    }
}

pub async fn delete_by_project_and_kind<C>(
    db: &C,
    project_id: Id,
    credential_kind: CredentialKind,
) -> Result<(), Error>
where
    C: ConnectionTrait,
{
    Entity::delete_many()
        .filter(Column::ProjectId.eq(project_id))
        .filter(Column::CredentialKind.eq(credential_kind))
        .exec(db)
        .await?;
    Ok(())
}

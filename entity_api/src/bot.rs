//! CRUD and compare-and-swap operations for the bots table.

use super::error::Error;
use entity::bot_state::BotState;
use entity::bots::{ActiveModel, Column, Entity, Model};
use entity::Id;
use log::*;
use sea_orm::{entity::prelude::*, sea_query::Expr, ActiveValue::Set, ConnectionTrait, QueryOrder};

pub async fn create<C>(db: &C, model: Model) -> Result<Model, Error>
where
    C: ConnectionTrait,
{
    debug!(
        "Creating new bot {} for project {}",
        model.object_id, model.project_id
    );

    let now = chrono::Utc::now();

    let active_model = ActiveModel {
        id: Set(Id::new_v4()),
        object_id: Set(model.object_id),
        project_id: Set(model.project_id),
        name: Set(model.name),
        meeting_url: Set(model.meeting_url),
        state: Set(model.state),
        settings: Set(model.settings),
        metadata: Set(model.metadata),
        first_heartbeat_timestamp: Set(None),
        last_heartbeat_timestamp: Set(None),
        join_at: Set(model.join_at),
        deduplication_key: Set(model.deduplication_key),
        session_kind: Set(model.session_kind),
        version: Set(0),
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

pub async fn find_by_object_id<C>(db: &C, object_id: &str) -> Result<Model, Error>
where
    C: ConnectionTrait,
{
    Entity::find()
        .filter(Column::ObjectId.eq(object_id))
        .one(db)
        .await?
        .ok_or_else(Error::record_not_found)
}

/// Moves the bot to `new_state` iff nobody else has written it since `bot`
/// was read. The version counter bumps on success; a lost race surfaces as
/// `StaleVersion`.
pub async fn update_state<C>(db: &C, bot: &Model, new_state: BotState) -> Result<(), Error>
where
    C: ConnectionTrait,
{
    let result = Entity::update_many()
        .col_expr(Column::State, Expr::value(new_state))
        .col_expr(Column::Version, Expr::col(Column::Version).add(1))
        .col_expr(
            Column::UpdatedAt,
            Expr::value(DateTimeWithTimeZone::from(chrono::Utc::now())),
        )
        .filter(Column::Id.eq(bot.id))
        .filter(Column::Version.eq(bot.version))
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        debug!("Stale state write for bot {} at version {}", bot.object_id, bot.version);
        return Err(Error::stale_version());
    }
    Ok(())
}

/// Writes the heartbeat timestamps under the same compare-and-swap regime as
/// `update_state`. The first heartbeat is only set once.
pub async fn set_heartbeat<C>(db: &C, bot: &Model, timestamp: i64) -> Result<(), Error>
where
    C: ConnectionTrait,
{
    let mut update = Entity::update_many()
        .col_expr(Column::LastHeartbeatTimestamp, Expr::value(Some(timestamp)))
        .col_expr(Column::Version, Expr::col(Column::Version).add(1))
        .col_expr(
            Column::UpdatedAt,
            Expr::value(DateTimeWithTimeZone::from(chrono::Utc::now())),
        );

    if bot.first_heartbeat_timestamp.is_none() {
        update = update.col_expr(Column::FirstHeartbeatTimestamp, Expr::value(Some(timestamp)));
    }

    let result = update
        .filter(Column::Id.eq(bot.id))
        .filter(Column::Version.eq(bot.version))
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        return Err(Error::stale_version());
    }
    Ok(())
}

pub async fn update_metadata<C>(db: &C, bot: &Model, metadata: Option<Json>) -> Result<(), Error>
where
    C: ConnectionTrait,
{
    let result = Entity::update_many()
        .col_expr(Column::Metadata, Expr::value(metadata))
        .col_expr(Column::Version, Expr::col(Column::Version).add(1))
        .col_expr(
            Column::UpdatedAt,
            Expr::value(DateTimeWithTimeZone::from(chrono::Utc::now())),
        )
        .filter(Column::Id.eq(bot.id))
        .filter(Column::Version.eq(bot.version))
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        return Err(Error::stale_version());
    }
    Ok(())
}

/// Counts bots in a project sharing a deduplication key that have not yet
/// reached a post-meeting state.
pub async fn count_active_with_deduplication_key<C>(
    db: &C,
    project_id: Id,
    deduplication_key: &str,
) -> Result<u64, Error>
where
    C: ConnectionTrait,
{
    let post_meeting: Vec<BotState> = BotState::post_meeting_states().to_vec();
    Ok(Entity::find()
        .filter(Column::ProjectId.eq(project_id))
        .filter(Column::DeduplicationKey.eq(deduplication_key))
        .filter(Column::State.is_not_in(post_meeting))
        .count(db)
        .await?)
}

pub async fn find_all_by_project<C>(db: &C, project_id: Id) -> Result<Vec<Model>, Error>
where
    C: ConnectionTrait,
{
    Ok(Entity::find()
        .filter(Column::ProjectId.eq(project_id))
        .order_by_asc(Column::CreatedAt)
        .all(db)
        .await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EntityApiErrorKind;
    use entity::session_kind::SessionKind;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn ready_bot() -> Model {
        let now = chrono::Utc::now();
        Model {
            id: Id::new_v4(),
            object_id: "bot_0123456789abcdef".to_owned(),
            project_id: Id::new_v4(),
            name: "My bot".to_owned(),
            meeting_url: "https://zoom.us/j/123456".to_owned(),
            state: BotState::Ready,
            settings: serde_json::json!({}),
            metadata: None,
            first_heartbeat_timestamp: None,
            last_heartbeat_timestamp: None,
            join_at: None,
            deduplication_key: None,
            session_kind: SessionKind::Bot,
            version: 3,
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    #[tokio::test]
    async fn update_state_fails_when_no_row_matches_the_version() -> Result<(), Error> {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }])
            .into_connection();

        let result = update_state(&db, &ready_bot(), BotState::Joining).await;
        assert!(matches!(
            result,
            Err(Error {
                error_kind: EntityApiErrorKind::StaleVersion,
                ..
            })
        ));

        Ok(())
    }

    #[tokio::test]
    async fn update_state_succeeds_when_the_version_matches() -> Result<(), Error> {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .into_connection();

        update_state(&db, &ready_bot(), BotState::Joining).await?;

        Ok(())
    }
}

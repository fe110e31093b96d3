//! PostgreSQL implementation of ServerRepository

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{info, instrument};

use chat_core::entities::{NewServer, Server, ServerDeletion, ServerUpdate};
use chat_core::error::DomainError;
use chat_core::traits::{IdGenerator, RepoResult, ServerRepository};
use chat_core::value_objects::Snowflake;

use crate::models::ServerModel;

use super::error::map_db_error;
use super::membership::insert_membership;

/// PostgreSQL implementation of ServerRepository
#[derive(Clone)]
pub struct PgServerRepository {
    pool: PgPool,
    ids: Arc<dyn IdGenerator>,
}

impl PgServerRepository {
    /// Create a new PgServerRepository
    pub fn new(pool: PgPool, ids: Arc<dyn IdGenerator>) -> Self {
        Self { pool, ids }
    }
}

#[async_trait]
impl ServerRepository for PgServerRepository {
    #[instrument(skip(self))]
    async fn create(&self, server: NewServer) -> RepoResult<Server> {
        let server = server.validated()?;
        let id = self.ids.next_id();

        // Server row and owner membership commit together or not at all
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        let model = sqlx::query_as::<_, ServerModel>(
            r"
            INSERT INTO servers (id, name, image, created_at)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, image, created_at
            ",
        )
        .bind(id.into_inner())
        .bind(&server.name)
        .bind(&server.image)
        .bind(id.created_at())
        .fetch_one(&mut *tx)
        .await
        .map_err(map_db_error)?;

        insert_membership(&mut tx, self.ids.as_ref(), id, server.owner_id, true).await?;

        tx.commit().await.map_err(map_db_error)?;

        info!(server_id = %id, owner_id = %server.owner_id, "Server created");
        Ok(Server::from(model))
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Server>> {
        let result = sqlx::query_as::<_, ServerModel>(
            r"
            SELECT id, name, image, created_at
            FROM servers
            WHERE id = $1
            ",
        )
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(Server::from))
    }

    #[instrument(skip(self))]
    async fn list_for_user(&self, user_id: Snowflake) -> RepoResult<Vec<Server>> {
        let results = sqlx::query_as::<_, ServerModel>(
            r"
            SELECT s.id, s.name, s.image, s.created_at
            FROM servers s
            JOIN memberships m ON m.server_id = s.id
            WHERE m.user_id = $1
            ORDER BY m.joined_at ASC, m.id ASC
            ",
        )
        .bind(user_id.into_inner())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(Server::from).collect())
    }

    #[instrument(skip(self))]
    async fn update(&self, id: Snowflake, update: ServerUpdate) -> RepoResult<Server> {
        let update = update.validated()?;
        if update.is_empty() {
            return self.get(id).await;
        }

        let (set_image, image) = match update.image {
            Some(image) => (true, image),
            None => (false, None),
        };

        let result = sqlx::query_as::<_, ServerModel>(
            r"
            UPDATE servers
            SET name = COALESCE($2, name),
                image = CASE WHEN $3 THEN $4 ELSE image END
            WHERE id = $1
            RETURNING id, name, image, created_at
            ",
        )
        .bind(id.into_inner())
        .bind(&update.name)
        .bind(set_image)
        .bind(image)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        result
            .map(Server::from)
            .ok_or(DomainError::ServerNotFound(id))
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: Snowflake) -> RepoResult<ServerDeletion> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        let exists = sqlx::query_scalar::<_, i64>(
            r"
            SELECT id FROM servers WHERE id = $1 FOR UPDATE
            ",
        )
        .bind(id.into_inner())
        .fetch_optional(&mut *tx)
        .await
        .map_err(map_db_error)?;

        if exists.is_none() {
            return Err(DomainError::ServerNotFound(id));
        }

        let messages = sqlx::query(
            r"
            DELETE FROM messages
            WHERE channel_id IN (SELECT id FROM channels WHERE server_id = $1)
            ",
        )
        .bind(id.into_inner())
        .execute(&mut *tx)
        .await
        .map_err(map_db_error)?
        .rows_affected();

        let channels = sqlx::query("DELETE FROM channels WHERE server_id = $1")
            .bind(id.into_inner())
            .execute(&mut *tx)
            .await
            .map_err(map_db_error)?
            .rows_affected();

        let invites = sqlx::query("DELETE FROM invites WHERE server_id = $1")
            .bind(id.into_inner())
            .execute(&mut *tx)
            .await
            .map_err(map_db_error)?
            .rows_affected();

        let memberships = sqlx::query("DELETE FROM memberships WHERE server_id = $1")
            .bind(id.into_inner())
            .execute(&mut *tx)
            .await
            .map_err(map_db_error)?
            .rows_affected();

        sqlx::query("DELETE FROM servers WHERE id = $1")
            .bind(id.into_inner())
            .execute(&mut *tx)
            .await
            .map_err(map_db_error)?;

        tx.commit().await.map_err(map_db_error)?;

        let deletion = ServerDeletion {
            channels,
            messages,
            memberships,
            invites,
        };
        info!(server_id = %id, ?deletion, "Server deleted");

        Ok(deletion)
    }
}

//! PostgreSQL implementation of ChannelRepository

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{info, instrument};

use chat_core::entities::{Channel, NewChannel};
use chat_core::error::DomainError;
use chat_core::traits::{ChannelRepository, IdGenerator, RepoResult};
use chat_core::value_objects::Snowflake;

use crate::models::ChannelModel;

use super::error::{constraints, map_db_error, map_violation, Violation};

/// PostgreSQL implementation of ChannelRepository
#[derive(Clone)]
pub struct PgChannelRepository {
    pool: PgPool,
    ids: Arc<dyn IdGenerator>,
}

impl PgChannelRepository {
    /// Create a new PgChannelRepository
    pub fn new(pool: PgPool, ids: Arc<dyn IdGenerator>) -> Self {
        Self { pool, ids }
    }
}

#[async_trait]
impl ChannelRepository for PgChannelRepository {
    #[instrument(skip(self))]
    async fn create(&self, channel: NewChannel) -> RepoResult<Channel> {
        let channel = channel.validated()?;
        let id = self.ids.next_id();

        let model = sqlx::query_as::<_, ChannelModel>(
            r"
            INSERT INTO channels (id, server_id, kind, name, created_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, server_id, kind, name, created_at
            ",
        )
        .bind(id.into_inner())
        .bind(channel.server_id.into_inner())
        .bind(channel.kind.as_i16())
        .bind(&channel.name)
        .bind(id.created_at())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            map_violation(e, |v| match v {
                Violation::ForeignKey(constraints::CHANNELS_SERVER_FK) => {
                    Some(DomainError::ServerNotFound(channel.server_id))
                }
                _ => None,
            })
        })?;

        Ok(Channel::from(model))
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Channel>> {
        let result = sqlx::query_as::<_, ChannelModel>(
            r"
            SELECT id, server_id, kind, name, created_at
            FROM channels
            WHERE id = $1
            ",
        )
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(Channel::from))
    }

    #[instrument(skip(self))]
    async fn list_by_server(&self, server_id: Snowflake) -> RepoResult<Vec<Channel>> {
        let results = sqlx::query_as::<_, ChannelModel>(
            r"
            SELECT id, server_id, kind, name, created_at
            FROM channels
            WHERE server_id = $1
            ORDER BY created_at ASC, id ASC
            ",
        )
        .bind(server_id.into_inner())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(Channel::from).collect())
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: Snowflake) -> RepoResult<u64> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        let exists = sqlx::query_scalar::<_, i64>(
            r"
            SELECT id FROM channels WHERE id = $1 FOR UPDATE
            ",
        )
        .bind(id.into_inner())
        .fetch_optional(&mut *tx)
        .await
        .map_err(map_db_error)?;

        if exists.is_none() {
            return Err(DomainError::ChannelNotFound(id));
        }

        let messages = sqlx::query("DELETE FROM messages WHERE channel_id = $1")
            .bind(id.into_inner())
            .execute(&mut *tx)
            .await
            .map_err(map_db_error)?
            .rows_affected();

        sqlx::query("DELETE FROM channels WHERE id = $1")
            .bind(id.into_inner())
            .execute(&mut *tx)
            .await
            .map_err(map_db_error)?;

        tx.commit().await.map_err(map_db_error)?;

        info!(channel_id = %id, messages, "Channel deleted");
        Ok(messages)
    }
}

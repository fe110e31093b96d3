//! PostgreSQL implementation of MessageRepository

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use chat_core::entities::{Message, NewMessage};
use chat_core::error::DomainError;
use chat_core::traits::{IdGenerator, MessageRepository, RepoResult, MAX_PAGE_SIZE};
use chat_core::validation;
use chat_core::value_objects::{Page, PageCursor, Snowflake};

use crate::models::MessageModel;

use super::error::{constraints, map_db_error, map_violation, Violation};

/// PostgreSQL implementation of MessageRepository
#[derive(Clone)]
pub struct PgMessageRepository {
    pool: PgPool,
    ids: Arc<dyn IdGenerator>,
}

impl PgMessageRepository {
    /// Create a new PgMessageRepository
    pub fn new(pool: PgPool, ids: Arc<dyn IdGenerator>) -> Self {
        Self { pool, ids }
    }
}

#[async_trait]
impl MessageRepository for PgMessageRepository {
    #[instrument(skip(self))]
    async fn post(&self, message: NewMessage) -> RepoResult<Message> {
        let message = message.validated()?;

        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        // Posts to one channel serialize on its row until commit, so ids
        // (and sent_at) become visible in order and no cursor skips a row
        sqlx::query_scalar::<_, i64>("SELECT id FROM channels WHERE id = $1 FOR NO KEY UPDATE")
            .bind(message.channel_id.into_inner())
            .fetch_optional(&mut *tx)
            .await
            .map_err(map_db_error)?
            .ok_or(DomainError::ChannelNotFound(message.channel_id))?;

        let id = self.ids.next_id();

        let model = sqlx::query_as::<_, MessageModel>(
            r"
            INSERT INTO messages (id, channel_id, author_id, body, sent_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, channel_id, author_id, body, sent_at, edited_at, deleted_at
            ",
        )
        .bind(id.into_inner())
        .bind(message.channel_id.into_inner())
        .bind(message.author_id.into_inner())
        .bind(&message.body)
        .bind(id.created_at())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            map_violation(e, |v| match v {
                Violation::ForeignKey(constraints::MESSAGES_CHANNEL_FK) => {
                    Some(DomainError::ChannelNotFound(message.channel_id))
                }
                Violation::ForeignKey(constraints::MESSAGES_AUTHOR_FK) => {
                    Some(DomainError::UserNotFound(message.author_id))
                }
                _ => None,
            })
        })?;

        tx.commit().await.map_err(map_db_error)?;

        Ok(Message::from(model))
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Message>> {
        let result = sqlx::query_as::<_, MessageModel>(
            r"
            SELECT id, channel_id, author_id, body, sent_at, edited_at, deleted_at
            FROM messages
            WHERE id = $1 AND deleted_at IS NULL
            ",
        )
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(Message::from))
    }

    #[instrument(skip(self))]
    async fn list(
        &self,
        channel_id: Snowflake,
        after: Option<PageCursor>,
        limit: i64,
    ) -> RepoResult<Page<Message>> {
        let limit = limit.clamp(1, MAX_PAGE_SIZE);

        // Keyset predicate only; one extra row tells whether more exist
        let rows = sqlx::query_as::<_, MessageModel>(
            r"
            SELECT id, channel_id, author_id, body, sent_at, edited_at, deleted_at
            FROM messages
            WHERE channel_id = $1
              AND deleted_at IS NULL
              AND ($2::timestamptz IS NULL OR (sent_at, id) > ($2::timestamptz, $3::bigint))
            ORDER BY sent_at ASC, id ASC
            LIMIT $4
            ",
        )
        .bind(channel_id.into_inner())
        .bind(after.map(|c| c.at))
        .bind(after.map(|c| c.id.into_inner()))
        .bind(limit + 1)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        let messages = rows.into_iter().map(Message::from).collect();
        Ok(Page::from_overfetch(
            messages,
            limit as usize,
            after,
            Message::cursor,
        ))
    }

    #[instrument(skip(self, body))]
    async fn edit(&self, id: Snowflake, body: &str) -> RepoResult<Message> {
        let body = validation::message_body(body)?;

        let result = sqlx::query_as::<_, MessageModel>(
            r"
            UPDATE messages
            SET body = $2, edited_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING id, channel_id, author_id, body, sent_at, edited_at, deleted_at
            ",
        )
        .bind(id.into_inner())
        .bind(&body)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        result
            .map(Message::from)
            .ok_or(DomainError::MessageNotFound(id))
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: Snowflake) -> RepoResult<()> {
        let result = sqlx::query(
            r"
            UPDATE messages
            SET deleted_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            ",
        )
        .bind(id.into_inner())
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(DomainError::MessageNotFound(id));
        }

        Ok(())
    }
}

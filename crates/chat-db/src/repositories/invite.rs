//! PostgreSQL implementation of InviteRepository

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use sqlx::PgPool;
use tracing::{debug, info, instrument, warn};

use chat_core::entities::{generate_invite_code, Invite, Membership};
use chat_core::error::DomainError;
use chat_core::traits::{IdGenerator, InviteRepository, RepoResult};
use chat_core::value_objects::Snowflake;

use crate::models::InviteModel;

use super::error::{constraints, map_db_error, map_violation, violation, Violation};
use super::membership::insert_membership;

/// Attempts at finding an unused code before giving up
const CODE_ATTEMPTS: usize = 5;

/// PostgreSQL implementation of InviteRepository
#[derive(Clone)]
pub struct PgInviteRepository {
    pool: PgPool,
    ids: Arc<dyn IdGenerator>,
    ttl: Duration,
}

impl PgInviteRepository {
    /// Create a new PgInviteRepository whose invites live for `ttl`
    pub fn new(pool: PgPool, ids: Arc<dyn IdGenerator>, ttl: Duration) -> Self {
        Self { pool, ids, ttl }
    }
}

#[async_trait]
impl InviteRepository for PgInviteRepository {
    #[instrument(skip(self))]
    async fn create(
        &self,
        server_id: Snowflake,
        creator_id: Option<Snowflake>,
    ) -> RepoResult<Invite> {
        for attempt in 1..=CODE_ATTEMPTS {
            let code = generate_invite_code();
            let created_at = Utc::now();

            let result = sqlx::query_as::<_, InviteModel>(
                r"
                INSERT INTO invites (code, server_id, creator_id, created_at, expires_at)
                VALUES ($1, $2, $3, $4, $5)
                RETURNING code, server_id, creator_id, created_at, expires_at
                ",
            )
            .bind(&code)
            .bind(server_id.into_inner())
            .bind(creator_id.map(Snowflake::into_inner))
            .bind(created_at)
            .bind(Invite::expiry_from(created_at, self.ttl))
            .fetch_one(&self.pool)
            .await;

            match result {
                Ok(model) => return Ok(Invite::from(model)),
                Err(e) if violation(&e) == Some(Violation::Unique(constraints::INVITES_PKEY)) => {
                    warn!(attempt, "Invite code collision, retrying");
                }
                Err(e) => {
                    return Err(map_violation(e, |v| match v {
                        Violation::ForeignKey(constraints::INVITES_SERVER_FK) => {
                            Some(DomainError::ServerNotFound(server_id))
                        }
                        Violation::ForeignKey(constraints::INVITES_CREATOR_FK) => {
                            creator_id.map(DomainError::UserNotFound)
                        }
                        _ => None,
                    }));
                }
            }
        }

        Err(DomainError::ConstraintViolation(format!(
            "no unused invite code after {CODE_ATTEMPTS} attempts"
        )))
    }

    #[instrument(skip(self))]
    async fn find_by_code(&self, code: &str) -> RepoResult<Option<Invite>> {
        let result = sqlx::query_as::<_, InviteModel>(
            r"
            SELECT code, server_id, creator_id, created_at, expires_at
            FROM invites
            WHERE code = $1
            ",
        )
        .bind(code)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(Invite::from))
    }

    #[instrument(skip(self))]
    async fn redeem(&self, code: &str, user_id: Snowflake) -> RepoResult<Membership> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        let invite: Invite = sqlx::query_as::<_, InviteModel>(
            r"
            SELECT code, server_id, creator_id, created_at, expires_at
            FROM invites
            WHERE code = $1
            FOR UPDATE
            ",
        )
        .bind(code)
        .fetch_optional(&mut *tx)
        .await
        .map_err(map_db_error)?
        .map(Invite::from)
        .ok_or_else(|| DomainError::InviteNotFound(code.to_string()))?;

        if invite.is_expired() {
            sqlx::query("DELETE FROM invites WHERE code = $1")
                .bind(code)
                .execute(&mut *tx)
                .await
                .map_err(map_db_error)?;
            tx.commit().await.map_err(map_db_error)?;

            debug!(code, "Expired invite removed on redeem");
            return Err(DomainError::InviteExpired);
        }

        let membership =
            insert_membership(&mut tx, self.ids.as_ref(), invite.server_id, user_id, false)
                .await?;

        tx.commit().await.map_err(map_db_error)?;

        info!(server_id = %invite.server_id, %user_id, "Invite redeemed");
        Ok(membership)
    }

    #[instrument(skip(self))]
    async fn delete(&self, code: &str) -> RepoResult<()> {
        let result = sqlx::query("DELETE FROM invites WHERE code = $1")
            .bind(code)
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(DomainError::InviteNotFound(code.to_string()));
        }

        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_expired(&self, now: DateTime<Utc>) -> RepoResult<u64> {
        let removed = sqlx::query("DELETE FROM invites WHERE expires_at <= $1")
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?
            .rows_affected();

        if removed > 0 {
            info!(removed, "Expired invites removed");
        }

        Ok(removed)
    }
}

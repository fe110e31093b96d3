//! PostgreSQL implementation of UserRepository

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::{info, instrument};

use chat_core::entities::{NewUser, PresenceStatus, ProfileUpdate, User, UserDeletion};
use chat_core::error::DomainError;
use chat_core::traits::{IdGenerator, RepoResult, UserRepository};
use chat_core::value_objects::{CredentialHash, Snowflake};

use crate::mappers::UserUpdate;
use crate::models::UserModel;

use super::error::{constraints, map_db_error, map_violation, Violation};

/// PostgreSQL implementation of UserRepository
#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
    ids: Arc<dyn IdGenerator>,
}

impl PgUserRepository {
    /// Create a new PgUserRepository
    pub fn new(pool: PgPool, ids: Arc<dyn IdGenerator>) -> Self {
        Self { pool, ids }
    }
}

fn duplicate_username(e: sqlx::Error, username: &str) -> DomainError {
    map_violation(e, |v| match v {
        Violation::Unique(constraints::USERS_USERNAME) => {
            Some(DomainError::DuplicateUsername(username.to_string()))
        }
        _ => None,
    })
}

#[async_trait]
impl UserRepository for PgUserRepository {
    #[instrument(skip(self))]
    async fn create(&self, user: NewUser) -> RepoResult<User> {
        let user = user.validated()?;
        let id = self.ids.next_id();

        let model = sqlx::query_as::<_, UserModel>(
            r"
            INSERT INTO users (id, username, display_name, password_hash, email, language, avatar, joined_at, last_seen)
            VALUES ($1, $2, $3, $4, $5, COALESCE($6, 'en'), $7, $8, $8)
            RETURNING id, username, display_name, email, language, status, bio, custom_status, pronouns, avatar, joined_at, last_seen
            ",
        )
        .bind(id.into_inner())
        .bind(&user.username)
        .bind(&user.display_name)
        .bind(user.password_hash.as_str())
        .bind(&user.email)
        .bind(&user.language)
        .bind(&user.avatar)
        .bind(id.created_at())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| duplicate_username(e, &user.username))?;

        info!(user_id = %id, username = %model.username, "User created");
        Ok(User::from(model))
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<User>> {
        let result = sqlx::query_as::<_, UserModel>(
            r"
            SELECT id, username, display_name, email, language, status, bio, custom_status, pronouns, avatar, joined_at, last_seen
            FROM users
            WHERE id = $1
            ",
        )
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(User::from))
    }

    #[instrument(skip(self))]
    async fn find_by_username(&self, username: &str) -> RepoResult<Option<User>> {
        let result = sqlx::query_as::<_, UserModel>(
            r"
            SELECT id, username, display_name, email, language, status, bio, custom_status, pronouns, avatar, joined_at, last_seen
            FROM users
            WHERE username = $1
            ",
        )
        .bind(username.trim())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(User::from))
    }

    #[instrument(skip(self))]
    async fn get_password_hash(&self, id: Snowflake) -> RepoResult<CredentialHash> {
        let hash = sqlx::query_scalar::<_, String>(
            r"
            SELECT password_hash FROM users WHERE id = $1
            ",
        )
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?
        .ok_or(DomainError::UserNotFound(id))?;

        CredentialHash::new(hash)
    }

    #[instrument(skip(self, password_hash))]
    async fn update_password(
        &self,
        id: Snowflake,
        password_hash: &CredentialHash,
    ) -> RepoResult<()> {
        let result = sqlx::query(
            r"
            UPDATE users SET password_hash = $2 WHERE id = $1
            ",
        )
        .bind(id.into_inner())
        .bind(password_hash.as_str())
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(DomainError::UserNotFound(id));
        }

        Ok(())
    }

    #[instrument(skip(self))]
    async fn update_profile(&self, id: Snowflake, update: ProfileUpdate) -> RepoResult<User> {
        let update = update.validated()?;

        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        let mut user: User = sqlx::query_as::<_, UserModel>(
            r"
            SELECT id, username, display_name, email, language, status, bio, custom_status, pronouns, avatar, joined_at, last_seen
            FROM users
            WHERE id = $1
            FOR UPDATE
            ",
        )
        .bind(id.into_inner())
        .fetch_optional(&mut *tx)
        .await
        .map_err(map_db_error)?
        .map(User::from)
        .ok_or(DomainError::UserNotFound(id))?;

        if update.is_empty() {
            return Ok(user);
        }

        update.apply(&mut user);
        let row = UserUpdate::new(&user);

        let model = sqlx::query_as::<_, UserModel>(
            r"
            UPDATE users
            SET username = $2, display_name = $3, email = $4, language = $5,
                bio = $6, custom_status = $7, pronouns = $8, avatar = $9
            WHERE id = $1
            RETURNING id, username, display_name, email, language, status, bio, custom_status, pronouns, avatar, joined_at, last_seen
            ",
        )
        .bind(row.id)
        .bind(row.username)
        .bind(row.display_name)
        .bind(row.email)
        .bind(row.language)
        .bind(row.bio)
        .bind(row.custom_status)
        .bind(row.pronouns)
        .bind(row.avatar)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| duplicate_username(e, row.username))?;

        tx.commit().await.map_err(map_db_error)?;

        Ok(User::from(model))
    }

    #[instrument(skip(self))]
    async fn update_last_seen(&self, id: Snowflake, at: DateTime<Utc>) -> RepoResult<()> {
        let result = sqlx::query(
            r"
            UPDATE users SET last_seen = $2 WHERE id = $1
            ",
        )
        .bind(id.into_inner())
        .bind(at)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(DomainError::UserNotFound(id));
        }

        Ok(())
    }

    #[instrument(skip(self))]
    async fn set_presence(&self, id: Snowflake, status: PresenceStatus) -> RepoResult<()> {
        let result = sqlx::query(
            r"
            UPDATE users
            SET status = $2,
                last_seen = CASE WHEN $2 = 0 THEN NOW() ELSE last_seen END
            WHERE id = $1
            ",
        )
        .bind(id.into_inner())
        .bind(status.as_i16())
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(DomainError::UserNotFound(id));
        }

        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: Snowflake) -> RepoResult<UserDeletion> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        let exists = sqlx::query_scalar::<_, i64>(
            r"
            SELECT id FROM users WHERE id = $1 FOR UPDATE
            ",
        )
        .bind(id.into_inner())
        .fetch_optional(&mut *tx)
        .await
        .map_err(map_db_error)?;

        if exists.is_none() {
            return Err(DomainError::UserNotFound(id));
        }

        // Lock every owner row of the servers this user owns, then look for
        // one where nobody else holds ownership.
        sqlx::query(
            r"
            SELECT id FROM memberships
            WHERE owner
              AND server_id IN (SELECT server_id FROM memberships WHERE user_id = $1 AND owner)
            ORDER BY id
            FOR UPDATE
            ",
        )
        .bind(id.into_inner())
        .execute(&mut *tx)
        .await
        .map_err(map_db_error)?;

        let sole_owned = sqlx::query_scalar::<_, i64>(
            r"
            SELECT m.server_id FROM memberships m
            WHERE m.user_id = $1 AND m.owner
              AND NOT EXISTS (
                  SELECT 1 FROM memberships o
                  WHERE o.server_id = m.server_id AND o.owner AND o.user_id <> $1
              )
            LIMIT 1
            ",
        )
        .bind(id.into_inner())
        .fetch_optional(&mut *tx)
        .await
        .map_err(map_db_error)?;

        if let Some(server_id) = sole_owned {
            return Err(DomainError::ConstraintViolation(format!(
                "user {id} is the only owner of server {server_id}"
            )));
        }

        let messages_tombstoned = sqlx::query(
            r"
            UPDATE messages SET author_id = NULL WHERE author_id = $1
            ",
        )
        .bind(id.into_inner())
        .execute(&mut *tx)
        .await
        .map_err(map_db_error)?
        .rows_affected();

        let memberships_removed = sqlx::query(
            r"
            DELETE FROM memberships WHERE user_id = $1
            ",
        )
        .bind(id.into_inner())
        .execute(&mut *tx)
        .await
        .map_err(map_db_error)?
        .rows_affected();

        sqlx::query(
            r"
            DELETE FROM users WHERE id = $1
            ",
        )
        .bind(id.into_inner())
        .execute(&mut *tx)
        .await
        .map_err(map_db_error)?;

        tx.commit().await.map_err(map_db_error)?;

        info!(
            user_id = %id,
            memberships_removed,
            messages_tombstoned,
            "User deleted"
        );

        Ok(UserDeletion {
            memberships_removed,
            messages_tombstoned,
        })
    }
}

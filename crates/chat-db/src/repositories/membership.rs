//! PostgreSQL implementation of MembershipRepository

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::{PgConnection, PgPool};
use tracing::{debug, instrument};

use chat_core::entities::{Member, Membership};
use chat_core::error::DomainError;
use chat_core::traits::{IdGenerator, MembershipRepository, RepoResult};
use chat_core::value_objects::{Page, PageRequest, Snowflake};

use crate::models::{MemberModel, MembershipModel};

use super::error::{constraints, map_db_error, map_violation, Violation};

/// Largest page `list_members` returns
const MAX_MEMBER_PAGE: i64 = 100;

/// PostgreSQL implementation of MembershipRepository
#[derive(Clone)]
pub struct PgMembershipRepository {
    pool: PgPool,
    ids: Arc<dyn IdGenerator>,
}

impl PgMembershipRepository {
    /// Create a new PgMembershipRepository
    pub fn new(pool: PgPool, ids: Arc<dyn IdGenerator>) -> Self {
        Self { pool, ids }
    }
}

/// Insert a membership row, translating constraint violations
///
/// Shared by server creation (owner) and invite redemption so that both go
/// through the same integrity mapping. Must run inside a transaction: the
/// server row stays locked until commit, so memberships of one server commit
/// in id order and `(joined_at, id)` cursors never skip a late commit.
pub(crate) async fn insert_membership(
    conn: &mut PgConnection,
    ids: &dyn IdGenerator,
    server_id: Snowflake,
    user_id: Snowflake,
    owner: bool,
) -> RepoResult<Membership> {
    sqlx::query_scalar::<_, i64>("SELECT id FROM servers WHERE id = $1 FOR NO KEY UPDATE")
        .bind(server_id.into_inner())
        .fetch_optional(&mut *conn)
        .await
        .map_err(map_db_error)?
        .ok_or(DomainError::ServerNotFound(server_id))?;

    // Taken under the lock
    let id = ids.next_id();

    let model = sqlx::query_as::<_, MembershipModel>(
        r"
        INSERT INTO memberships (id, server_id, user_id, owner, joined_at)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id, server_id, user_id, owner, joined_at
        ",
    )
    .bind(id.into_inner())
    .bind(server_id.into_inner())
    .bind(user_id.into_inner())
    .bind(owner)
    .bind(id.created_at())
    .fetch_one(conn)
    .await
    .map_err(|e| {
        map_violation(e, |v| match v {
            Violation::Unique(constraints::MEMBERSHIPS_SERVER_USER) => {
                Some(DomainError::AlreadyMember)
            }
            Violation::ForeignKey(constraints::MEMBERSHIPS_SERVER_FK) => {
                Some(DomainError::ServerNotFound(server_id))
            }
            Violation::ForeignKey(constraints::MEMBERSHIPS_USER_FK) => {
                Some(DomainError::UserNotFound(user_id))
            }
            _ => None,
        })
    })?;

    Ok(Membership::from(model))
}

/// Lock the server's owner rows (in id order) and return the owners' user ids
async fn lock_owners(conn: &mut PgConnection, server_id: Snowflake) -> RepoResult<Vec<i64>> {
    sqlx::query_scalar::<_, i64>(
        r"
        SELECT user_id FROM memberships
        WHERE server_id = $1 AND owner
        ORDER BY id
        FOR UPDATE
        ",
    )
    .bind(server_id.into_inner())
    .fetch_all(conn)
    .await
    .map_err(map_db_error)
}

/// Lock one membership row and return its owner flag
async fn lock_membership(
    conn: &mut PgConnection,
    server_id: Snowflake,
    user_id: Snowflake,
) -> RepoResult<bool> {
    sqlx::query_scalar::<_, bool>(
        r"
        SELECT owner FROM memberships
        WHERE server_id = $1 AND user_id = $2
        FOR UPDATE
        ",
    )
    .bind(server_id.into_inner())
    .bind(user_id.into_inner())
    .fetch_optional(conn)
    .await
    .map_err(map_db_error)?
    .ok_or(DomainError::MembershipNotFound { server_id, user_id })
}

/// True if someone other than `user_id` holds ownership
fn has_other_owner(owners: &[i64], user_id: Snowflake) -> bool {
    owners.iter().any(|&owner| owner != user_id.into_inner())
}

#[async_trait]
impl MembershipRepository for PgMembershipRepository {
    #[instrument(skip(self))]
    async fn join(&self, server_id: Snowflake, user_id: Snowflake) -> RepoResult<Membership> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        let membership =
            insert_membership(&mut tx, self.ids.as_ref(), server_id, user_id, false).await?;

        tx.commit().await.map_err(map_db_error)?;

        debug!(%server_id, %user_id, "Member joined server");
        Ok(membership)
    }

    #[instrument(skip(self))]
    async fn leave(&self, server_id: Snowflake, user_id: Snowflake) -> RepoResult<()> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        let owners = lock_owners(&mut tx, server_id).await?;
        let is_owner = lock_membership(&mut tx, server_id, user_id).await?;

        if is_owner && !has_other_owner(&owners, user_id) {
            return Err(DomainError::SoleOwner { server_id, user_id });
        }

        sqlx::query(
            r"
            DELETE FROM memberships WHERE server_id = $1 AND user_id = $2
            ",
        )
        .bind(server_id.into_inner())
        .bind(user_id.into_inner())
        .execute(&mut *tx)
        .await
        .map_err(map_db_error)?;

        tx.commit().await.map_err(map_db_error)?;

        debug!(%server_id, %user_id, "Member left server");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn set_owner(
        &self,
        server_id: Snowflake,
        user_id: Snowflake,
        owner: bool,
    ) -> RepoResult<Membership> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        let owners = lock_owners(&mut tx, server_id).await?;
        let is_owner = lock_membership(&mut tx, server_id, user_id).await?;

        if is_owner && !owner && !has_other_owner(&owners, user_id) {
            return Err(DomainError::SoleOwner { server_id, user_id });
        }

        let model = sqlx::query_as::<_, MembershipModel>(
            r"
            UPDATE memberships SET owner = $3
            WHERE server_id = $1 AND user_id = $2
            RETURNING id, server_id, user_id, owner, joined_at
            ",
        )
        .bind(server_id.into_inner())
        .bind(user_id.into_inner())
        .bind(owner)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_db_error)?;

        tx.commit().await.map_err(map_db_error)?;

        Ok(Membership::from(model))
    }

    #[instrument(skip(self))]
    async fn find(
        &self,
        server_id: Snowflake,
        user_id: Snowflake,
    ) -> RepoResult<Option<Membership>> {
        let result = sqlx::query_as::<_, MembershipModel>(
            r"
            SELECT id, server_id, user_id, owner, joined_at
            FROM memberships
            WHERE server_id = $1 AND user_id = $2
            ",
        )
        .bind(server_id.into_inner())
        .bind(user_id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(Membership::from))
    }

    #[instrument(skip(self))]
    async fn is_member(&self, server_id: Snowflake, user_id: Snowflake) -> RepoResult<bool> {
        sqlx::query_scalar::<_, bool>(
            r"
            SELECT EXISTS(SELECT 1 FROM memberships WHERE server_id = $1 AND user_id = $2)
            ",
        )
        .bind(server_id.into_inner())
        .bind(user_id.into_inner())
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)
    }

    #[instrument(skip(self))]
    async fn list_members(
        &self,
        server_id: Snowflake,
        page: PageRequest,
    ) -> RepoResult<Page<Member>> {
        let limit = page.clamped_limit(MAX_MEMBER_PAGE);

        let rows = sqlx::query_as::<_, MemberModel>(
            r"
            SELECT m.id, m.server_id, m.user_id, m.owner, m.joined_at,
                   u.username, u.display_name, u.email, u.language, u.status, u.bio,
                   u.custom_status, u.pronouns, u.avatar, u.joined_at AS user_joined_at, u.last_seen
            FROM memberships m
            JOIN users u ON u.id = m.user_id
            WHERE m.server_id = $1
              AND ($2::timestamptz IS NULL OR (m.joined_at, m.id) > ($2::timestamptz, $3::bigint))
            ORDER BY m.joined_at ASC, m.id ASC
            LIMIT $4
            ",
        )
        .bind(server_id.into_inner())
        .bind(page.after.map(|c| c.at))
        .bind(page.after.map(|c| c.id.into_inner()))
        .bind(limit + 1)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        let members = rows.into_iter().map(Member::from).collect();
        Ok(Page::from_overfetch(
            members,
            limit as usize,
            page.after,
            Member::cursor,
        ))
    }
}

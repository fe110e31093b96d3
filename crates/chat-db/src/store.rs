//! Store facade wiring every repository to one pool and id generator

use std::sync::Arc;

use chrono::Duration;
use sqlx::migrate::MigrateError;
use sqlx::PgPool;
use tracing::info;

use chat_common::{AppConfig, AppError, AppResult};
use chat_core::traits::{
    ChannelRepository, IdGenerator, InviteRepository, MembershipRepository, MessageRepository,
    ServerRepository, UserRepository,
};
use chat_core::value_objects::SnowflakeGenerator;

use crate::pool::{create_pool, run_migrations, DatabaseConfig};
use crate::repositories::error::map_db_error;
use crate::repositories::{
    PgChannelRepository, PgInviteRepository, PgMembershipRepository, PgMessageRepository,
    PgServerRepository, PgUserRepository,
};

/// Entry point for collaborators: one handle per entity store
///
/// Cloning is cheap; every clone shares the same pool and id generator.
#[derive(Clone)]
pub struct ChatStore {
    pool: PgPool,
    users: Arc<dyn UserRepository>,
    servers: Arc<dyn ServerRepository>,
    memberships: Arc<dyn MembershipRepository>,
    channels: Arc<dyn ChannelRepository>,
    messages: Arc<dyn MessageRepository>,
    invites: Arc<dyn InviteRepository>,
}

impl ChatStore {
    /// Build the store over an existing pool
    pub fn new(pool: PgPool, ids: Arc<dyn IdGenerator>, invite_ttl: Duration) -> Self {
        Self {
            users: Arc::new(PgUserRepository::new(pool.clone(), ids.clone())),
            servers: Arc::new(PgServerRepository::new(pool.clone(), ids.clone())),
            memberships: Arc::new(PgMembershipRepository::new(pool.clone(), ids.clone())),
            channels: Arc::new(PgChannelRepository::new(pool.clone(), ids.clone())),
            messages: Arc::new(PgMessageRepository::new(pool.clone(), ids.clone())),
            invites: Arc::new(PgInviteRepository::new(pool.clone(), ids, invite_ttl)),
            pool,
        }
    }

    /// Connect, apply the schema and build the store from configuration
    pub async fn connect(config: &AppConfig) -> AppResult<Self> {
        let db_config = DatabaseConfig::from(&config.database);
        let pool = create_pool(&db_config).await.map_err(map_db_error)?;
        run_migrations(&pool).await.map_err(|e| match e {
            MigrateError::Execute(e) => AppError::from(map_db_error(e)),
            other => AppError::internal(other),
        })?;

        let ids = Arc::new(SnowflakeGenerator::new(config.snowflake.worker_id));

        info!(
            worker_id = config.snowflake.worker_id,
            invite_ttl_days = config.invite.ttl_days,
            "Chat store ready"
        );

        Ok(Self::new(pool, ids, Duration::days(config.invite.ttl_days)))
    }

    pub fn users(&self) -> Arc<dyn UserRepository> {
        self.users.clone()
    }

    pub fn servers(&self) -> Arc<dyn ServerRepository> {
        self.servers.clone()
    }

    pub fn memberships(&self) -> Arc<dyn MembershipRepository> {
        self.memberships.clone()
    }

    pub fn channels(&self) -> Arc<dyn ChannelRepository> {
        self.channels.clone()
    }

    pub fn messages(&self) -> Arc<dyn MessageRepository> {
        self.messages.clone()
    }

    pub fn invites(&self) -> Arc<dyn InviteRepository> {
        self.invites.clone()
    }

    /// Underlying pool, for health checks and shutdown
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

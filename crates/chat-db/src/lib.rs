//! # chat-db
//!
//! Persistence layer implementing the `chat-core` repository traits with
//! PostgreSQL via SQLx.
//!
//! ## Overview
//!
//! - Connection pool management and schema setup
//! - Database models with SQLx `FromRow` derives
//! - Entity ↔ Model mappers
//! - Repository implementations and the [`ChatStore`] facade
//!
//! ## Usage
//!
//! ```rust,ignore
//! use chat_common::AppConfig;
//! use chat_core::entities::NewServer;
//! use chat_db::ChatStore;
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AppConfig::from_env()?;
//!     let store = ChatStore::connect(&config).await?;
//!
//!     let owner = store.users().find_by_username("alice").await?;
//!     if let Some(owner) = owner {
//!         store.servers().create(NewServer::new("Test", owner.id)).await?;
//!     }
//!     Ok(())
//! }
//! ```

pub mod mappers;
pub mod models;
pub mod pool;
pub mod repositories;
pub mod store;

// Re-export commonly used types
pub use pool::{create_pool, run_migrations, DatabaseConfig, PgPool, MIGRATOR};
pub use repositories::{
    PgChannelRepository, PgInviteRepository, PgMembershipRepository, PgMessageRepository,
    PgServerRepository, PgUserRepository,
};
pub use store::ChatStore;

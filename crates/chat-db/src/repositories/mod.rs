//! Repository implementations
//!
//! PostgreSQL implementations of the repository traits defined in chat-core.
//! Each repository handles database operations for a specific domain entity.

mod channel;
pub mod error;
mod invite;
mod membership;
mod message;
mod server;
mod user;

pub use channel::PgChannelRepository;
pub use invite::PgInviteRepository;
pub use membership::PgMembershipRepository;
pub use message::PgMessageRepository;
pub use server::PgServerRepository;
pub use user::PgUserRepository;

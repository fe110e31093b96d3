//! Entity to model mappers
//!
//! This module provides conversions between domain entities (chat-core) and database models.
//! - `From<Model> for Entity`: Convert database rows to domain objects
//! - `*Update` structs: Prepare entity data for database writes

mod channel;
mod invite;
mod membership;
mod message;
mod server;
mod user;

pub use user::UserUpdate;

//! # chat-core
//!
//! Domain layer containing entities, value objects, validation rules, and
//! repository traits for the chat storage core.
//! This crate has zero dependencies on infrastructure (database, web framework, etc.).

pub mod entities;
pub mod error;
pub mod traits;
pub mod validation;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use entities::{
    generate_invite_code, Channel, ChannelKind, Invite, Member, Membership, Message, NewChannel,
    NewMessage, NewServer, NewUser, PresenceStatus, ProfileUpdate, Server, ServerDeletion,
    ServerUpdate, User, UserDeletion,
};
pub use error::DomainError;
pub use traits::{
    ChannelRepository, IdGenerator, InviteRepository, MembershipRepository, MessageRepository,
    RepoResult, ServerRepository, UserRepository, MAX_PAGE_SIZE,
};
pub use value_objects::{
    CredentialHash, CursorError, Page, PageCursor, PageRequest, Snowflake, SnowflakeGenerator,
    SnowflakeParseError,
};

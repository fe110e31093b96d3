//! Value objects - immutable types that represent domain concepts

mod credential;
mod page;
mod snowflake;

pub use credential::CredentialHash;
pub use page::{CursorError, Page, PageCursor, PageRequest};
pub use snowflake::{Snowflake, SnowflakeGenerator, SnowflakeParseError};

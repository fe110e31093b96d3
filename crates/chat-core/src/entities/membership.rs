//! Membership entity - a user's membership in a server

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::User;
use crate::value_objects::{PageCursor, Snowflake};

/// Server membership (junction between User and Server)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Membership {
    pub id: Snowflake,
    pub server_id: Snowflake,
    pub user_id: Snowflake,
    pub owner: bool,
    pub joined_at: DateTime<Utc>,
}

impl Membership {
    /// Position in the `(joined_at, id)` member ordering
    #[inline]
    pub fn cursor(&self) -> PageCursor {
        PageCursor::new(self.joined_at, self.id)
    }
}

/// Membership joined with the member's user record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Member {
    pub membership: Membership,
    pub user: User,
}

impl Member {
    #[inline]
    pub fn cursor(&self) -> PageCursor {
        self.membership.cursor()
    }
}

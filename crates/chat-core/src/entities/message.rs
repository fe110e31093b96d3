//! Message entity - represents a chat message

use chrono::{DateTime, Utc};
use serde::Serialize;
use validator::Validate;

use crate::error::DomainError;
use crate::validation;
use crate::value_objects::{PageCursor, Snowflake};

/// Message entity
///
/// `author_id` is `None` once the author's account has been deleted; the
/// message itself is kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
    pub id: Snowflake,
    pub channel_id: Snowflake,
    pub author_id: Option<Snowflake>,
    pub body: String,
    pub sent_at: DateTime<Utc>,
    pub edited_at: Option<DateTime<Utc>>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Message {
    /// Check if message has been edited
    #[inline]
    pub fn is_edited(&self) -> bool {
        self.edited_at.is_some()
    }

    #[inline]
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Check if the author's account no longer exists
    #[inline]
    pub fn is_tombstoned(&self) -> bool {
        self.author_id.is_none()
    }

    /// Position in the `(sent_at, id)` channel ordering
    #[inline]
    pub fn cursor(&self) -> PageCursor {
        PageCursor::new(self.sent_at, self.id)
    }
}

/// Input for `MessageRepository::post`
#[derive(Debug, Clone, PartialEq, Eq, Validate)]
pub struct NewMessage {
    pub channel_id: Snowflake,
    pub author_id: Snowflake,
    #[validate(
        length(max = 2000, message = "must be at most 2000 characters"),
        custom(function = "validation::message_text")
    )]
    pub body: String,
}

impl NewMessage {
    pub fn new(channel_id: Snowflake, author_id: Snowflake, body: impl Into<String>) -> Self {
        Self {
            channel_id,
            author_id,
            body: body.into(),
        }
    }

    /// Bodies are stored as given, surrounding whitespace included
    pub fn validated(self) -> Result<Self, DomainError> {
        validation::check(&self)?;
        Ok(self)
    }
}

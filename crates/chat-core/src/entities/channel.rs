//! Channel entity - a text or voice channel inside a server

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::DomainError;
use crate::validation;
use crate::value_objects::{PageCursor, Snowflake};

/// Channel kind, persisted as `SMALLINT`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum ChannelKind {
    #[default]
    Text = 1,
    Voice = 2,
}

impl ChannelKind {
    /// Get the numeric value
    #[inline]
    #[must_use]
    pub fn as_i16(self) -> i16 {
        self as i16
    }
}

impl From<i16> for ChannelKind {
    fn from(value: i16) -> Self {
        match value {
            2 => Self::Voice,
            _ => Self::Text, // Default for 1 and unknown values
        }
    }
}

impl From<ChannelKind> for i16 {
    fn from(kind: ChannelKind) -> Self {
        kind as i16
    }
}

/// Channel entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Channel {
    pub id: Snowflake,
    pub server_id: Snowflake,
    pub kind: ChannelKind,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl Channel {
    #[inline]
    pub fn is_text(&self) -> bool {
        self.kind == ChannelKind::Text
    }

    #[inline]
    pub fn is_voice(&self) -> bool {
        self.kind == ChannelKind::Voice
    }

    #[inline]
    pub fn cursor(&self) -> PageCursor {
        PageCursor::new(self.created_at, self.id)
    }
}

/// Input for `ChannelRepository::create`
#[derive(Debug, Clone, PartialEq, Eq, Validate)]
pub struct NewChannel {
    pub server_id: Snowflake,
    pub kind: ChannelKind,
    #[validate(
        length(min = 1, max = 100, message = "must be 1-100 characters"),
        custom(function = "validation::no_nul")
    )]
    pub name: String,
}

impl NewChannel {
    /// New text channel
    #[must_use]
    pub fn text(server_id: Snowflake, name: impl Into<String>) -> Self {
        Self {
            server_id,
            kind: ChannelKind::Text,
            name: name.into(),
        }
    }

    /// New voice channel
    #[must_use]
    pub fn voice(server_id: Snowflake, name: impl Into<String>) -> Self {
        Self {
            server_id,
            kind: ChannelKind::Voice,
            name: name.into(),
        }
    }

    pub fn validated(self) -> Result<Self, DomainError> {
        let input = Self {
            name: validation::trim(&self.name),
            ..self
        };
        validation::check(&input)?;
        Ok(input)
    }
}

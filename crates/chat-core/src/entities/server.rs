//! Server entity - a container of channels and members

use chrono::{DateTime, Utc};
use serde::Serialize;
use validator::Validate;

use crate::error::DomainError;
use crate::validation;
use crate::value_objects::Snowflake;

/// Server entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Server {
    pub id: Snowflake,
    pub name: String,
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Input for `ServerRepository::create`
///
/// `owner_id` receives the owner membership in the same transaction.
#[derive(Debug, Clone, PartialEq, Eq, Validate)]
pub struct NewServer {
    #[validate(
        length(min = 1, max = 100, message = "must be 1-100 characters"),
        custom(function = "validation::no_nul")
    )]
    pub name: String,
    #[validate(
        length(max = 512, message = "must be at most 512 characters"),
        custom(function = "validation::no_nul")
    )]
    pub image: Option<String>,
    pub owner_id: Snowflake,
}

impl NewServer {
    pub fn new(name: impl Into<String>, owner_id: Snowflake) -> Self {
        Self {
            name: name.into(),
            image: None,
            owner_id,
        }
    }

    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    pub fn validated(self) -> Result<Self, DomainError> {
        let input = Self {
            name: validation::trim(&self.name),
            image: validation::trim_optional(self.image),
            owner_id: self.owner_id,
        };
        validation::check(&input)?;
        Ok(input)
    }
}

/// Partial server update; `image: Some(None)` clears the image
#[derive(Debug, Clone, Default, PartialEq, Eq, Validate)]
pub struct ServerUpdate {
    #[validate(
        length(min = 1, max = 100, message = "must be 1-100 characters"),
        custom(function = "validation::no_nul")
    )]
    pub name: Option<String>,
    #[validate(
        length(max = 512, message = "must be at most 512 characters"),
        custom(function = "validation::no_nul")
    )]
    pub image: Option<Option<String>>,
}

impl ServerUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.image.is_none()
    }

    pub fn validated(self) -> Result<Self, DomainError> {
        let input = Self {
            name: self.name.map(|name| validation::trim(&name)),
            image: validation::trim_nullable(self.image),
        };
        validation::check(&input)?;
        Ok(input)
    }
}

/// Row counts removed by `ServerRepository::delete`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ServerDeletion {
    pub channels: u64,
    pub messages: u64,
    pub memberships: u64,
    pub invites: u64,
}

//! Domain errors - error types for the domain layer
//!
//! Every repository returns these. Storage-engine errors are translated into
//! one of the variants below by the adapter crate and never surface raw.

use thiserror::Error;

use crate::value_objects::Snowflake;

/// Domain layer errors
#[derive(Debug, Error)]
pub enum DomainError {
    // =========================================================================
    // Not Found Errors
    // =========================================================================
    #[error("User not found: {0}")]
    UserNotFound(Snowflake),

    #[error("Server not found: {0}")]
    ServerNotFound(Snowflake),

    #[error("Channel not found: {0}")]
    ChannelNotFound(Snowflake),

    #[error("Message not found: {0}")]
    MessageNotFound(Snowflake),

    #[error("User {user_id} is not a member of server {server_id}")]
    MembershipNotFound {
        server_id: Snowflake,
        user_id: Snowflake,
    },

    #[error("Invite not found: {0}")]
    InviteNotFound(String),

    // =========================================================================
    // Uniqueness Violations
    // =========================================================================
    #[error("Username already taken: {0}")]
    DuplicateUsername(String),

    #[error("Already a member of this server")]
    AlreadyMember,

    // =========================================================================
    // Validation Errors
    // =========================================================================
    #[error("Message body must not be empty")]
    EmptyBody,

    #[error("Invalid {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },

    // =========================================================================
    // Business Rule Violations
    // =========================================================================
    #[error("User {user_id} is the only owner of server {server_id}")]
    SoleOwner {
        server_id: Snowflake,
        user_id: Snowflake,
    },

    #[error("Invite has expired")]
    InviteExpired,

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    // =========================================================================
    // Infrastructure Errors (wrapped)
    // =========================================================================
    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    #[error("Storage operation timed out")]
    Timeout,

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl DomainError {
    /// Shorthand for [`DomainError::InvalidField`]
    pub fn invalid_field(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            field,
            reason: reason.into(),
        }
    }

    /// Get an error code string for API responses
    pub fn code(&self) -> &'static str {
        match self {
            // Not Found
            Self::UserNotFound(_) => "UNKNOWN_USER",
            Self::ServerNotFound(_) => "UNKNOWN_SERVER",
            Self::ChannelNotFound(_) => "UNKNOWN_CHANNEL",
            Self::MessageNotFound(_) => "UNKNOWN_MESSAGE",
            Self::MembershipNotFound { .. } => "UNKNOWN_MEMBER",
            Self::InviteNotFound(_) => "UNKNOWN_INVITE",

            // Uniqueness
            Self::DuplicateUsername(_) => "DUPLICATE_USERNAME",
            Self::AlreadyMember => "ALREADY_MEMBER",

            // Validation
            Self::EmptyBody => "EMPTY_BODY",
            Self::InvalidField { .. } => "INVALID_FIELD",

            // Business Rules
            Self::SoleOwner { .. } => "SOLE_OWNER",
            Self::InviteExpired => "INVITE_EXPIRED",
            Self::ConstraintViolation(_) => "CONSTRAINT_VIOLATION",

            // Infrastructure
            Self::TransactionFailed(_) => "TRANSACTION_FAILED",
            Self::Timeout => "TIMEOUT",
            Self::DatabaseError(_) => "DATABASE_ERROR",
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::UserNotFound(_)
                | Self::ServerNotFound(_)
                | Self::ChannelNotFound(_)
                | Self::MessageNotFound(_)
                | Self::MembershipNotFound { .. }
                | Self::InviteNotFound(_)
        )
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::EmptyBody | Self::InvalidField { .. })
    }

    /// Check if this is a conflict error
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            Self::DuplicateUsername(_)
                | Self::AlreadyMember
                | Self::SoleOwner { .. }
                | Self::ConstraintViolation(_)
        )
    }

    /// Check if the operation may succeed when retried unchanged
    ///
    /// Only infrastructure failures qualify; integrity and validation
    /// failures are terminal.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::TransactionFailed(_) | Self::Timeout)
    }
}

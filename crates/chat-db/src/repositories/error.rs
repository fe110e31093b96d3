//! Error handling utilities for repositories
//!
//! Every SQLx error leaving this crate goes through [`map_db_error`] or
//! [`map_violation`]; raw engine errors never reach callers.

use chat_core::error::DomainError;
use sqlx::Error as SqlxError;
use tracing::{debug, warn};

/// Constraint names from `migrations/0001_initial.sql`
pub mod constraints {
    pub const USERS_USERNAME: &str = "users_username_key";
    pub const MEMBERSHIPS_SERVER_USER: &str = "memberships_server_user_key";
    pub const MEMBERSHIPS_SERVER_FK: &str = "memberships_server_id_fkey";
    pub const MEMBERSHIPS_USER_FK: &str = "memberships_user_id_fkey";
    pub const CHANNELS_SERVER_FK: &str = "channels_server_id_fkey";
    pub const MESSAGES_CHANNEL_FK: &str = "messages_channel_id_fkey";
    pub const MESSAGES_AUTHOR_FK: &str = "messages_author_id_fkey";
    pub const INVITES_PKEY: &str = "invites_pkey";
    pub const INVITES_SERVER_FK: &str = "invites_server_id_fkey";
    pub const INVITES_CREATOR_FK: &str = "invites_creator_id_fkey";
}

/// Integrity violation reported by PostgreSQL, keyed by constraint name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Violation<'a> {
    Unique(&'a str),
    ForeignKey(&'a str),
}

/// Convert SQLx error to DomainError
pub fn map_db_error(e: SqlxError) -> DomainError {
    let mapped = match &e {
        SqlxError::PoolTimedOut => DomainError::Timeout,
        SqlxError::Io(_) | SqlxError::Tls(_) | SqlxError::PoolClosed | SqlxError::WorkerCrashed => {
            DomainError::TransactionFailed(e.to_string())
        }
        SqlxError::Database(db_err) => match db_err.code() {
            Some(code) => from_sqlstate(&code, db_err.message().to_string()),
            None => DomainError::DatabaseError(e.to_string()),
        },
        _ => DomainError::DatabaseError(e.to_string()),
    };

    if mapped.is_retryable() {
        warn!(error = %e, "Retryable storage failure");
    }

    mapped
}

/// Classify a PostgreSQL SQLSTATE
pub fn from_sqlstate(code: &str, message: String) -> DomainError {
    match code {
        // serialization_failure, deadlock_detected
        "40001" | "40P01" => DomainError::TransactionFailed(message),
        // query_canceled (statement_timeout), lock_not_available (lock_timeout)
        "57014" | "55P03" => DomainError::Timeout,
        // integrity_constraint_violation class
        c if c.starts_with("23") => DomainError::ConstraintViolation(message),
        // connection_exception class
        c if c.starts_with("08") => DomainError::TransactionFailed(message),
        // data_exception class: bad encoding, out-of-range value, overlong text
        c if c.starts_with("22") => {
            debug!(sqlstate = c, %message, "Value rejected by the database");
            DomainError::invalid_field("value", "is not accepted by the database")
        }
        _ => DomainError::DatabaseError(message),
    }
}

/// Find the unique/foreign-key constraint an error violated, if any
pub fn violation(e: &SqlxError) -> Option<Violation<'_>> {
    let db_err = e.as_database_error()?;
    let constraint = db_err.constraint().unwrap_or_default();

    if db_err.is_unique_violation() {
        Some(Violation::Unique(constraint))
    } else if db_err.is_foreign_key_violation() {
        Some(Violation::ForeignKey(constraint))
    } else {
        None
    }
}

/// Translate a violation into a domain error, falling back to [`map_db_error`]
pub fn map_violation<F>(e: SqlxError, on_violation: F) -> DomainError
where
    F: FnOnce(Violation<'_>) -> Option<DomainError>,
{
    if let Some(mapped) = violation(&e).and_then(on_violation) {
        return mapped;
    }
    map_db_error(e)
}

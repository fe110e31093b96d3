//! Membership database models

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for memberships table
#[derive(Debug, Clone, FromRow)]
pub struct MembershipModel {
    pub id: i64,
    pub server_id: i64,
    pub user_id: i64,
    pub owner: bool,
    pub joined_at: DateTime<Utc>,
}

/// Membership row joined with its user (for member listing)
#[derive(Debug, Clone, FromRow)]
pub struct MemberModel {
    pub id: i64,
    pub server_id: i64,
    pub user_id: i64,
    pub owner: bool,
    pub joined_at: DateTime<Utc>,
    pub username: String,
    pub display_name: Option<String>,
    pub email: Option<String>,
    pub language: String,
    pub status: i16,
    pub bio: Option<String>,
    pub custom_status: Option<String>,
    pub pronouns: Option<String>,
    pub avatar: Option<String>,
    pub user_joined_at: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
}

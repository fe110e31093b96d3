//! Channel database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for channels table
#[derive(Debug, Clone, FromRow)]
pub struct ChannelModel {
    pub id: i64,
    pub server_id: i64,
    pub kind: i16,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

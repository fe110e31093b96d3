//! Server database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for servers table
#[derive(Debug, Clone, FromRow)]
pub struct ServerModel {
    pub id: i64,
    pub name: String,
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
}

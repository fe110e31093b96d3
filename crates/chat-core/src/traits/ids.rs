//! Id allocation port

use crate::value_objects::Snowflake;

/// Source of fresh entity ids
///
/// Implementations must return strictly increasing ids within a process so
/// that id order matches creation order.
pub trait IdGenerator: Send + Sync {
    fn next_id(&self) -> Snowflake;
}

//! Channel entity <-> model mapper

use chat_core::entities::{Channel, ChannelKind};
use chat_core::value_objects::Snowflake;

use crate::models::ChannelModel;

/// Convert ChannelModel to Channel entity
impl From<ChannelModel> for Channel {
    fn from(model: ChannelModel) -> Self {
        Channel {
            id: Snowflake::new(model.id),
            server_id: Snowflake::new(model.server_id),
            kind: ChannelKind::from(model.kind),
            name: model.name,
            created_at: model.created_at,
        }
    }
}

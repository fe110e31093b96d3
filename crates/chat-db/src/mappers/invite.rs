//! Invite entity <-> model mapper

use chat_core::entities::Invite;
use chat_core::value_objects::Snowflake;

use crate::models::InviteModel;

/// Convert InviteModel to Invite entity
impl From<InviteModel> for Invite {
    fn from(model: InviteModel) -> Self {
        Invite {
            code: model.code,
            server_id: Snowflake::new(model.server_id),
            creator_id: model.creator_id.map(Snowflake::new),
            created_at: model.created_at,
            expires_at: model.expires_at,
        }
    }
}

//! Server entity <-> model mapper

use chat_core::entities::Server;
use chat_core::value_objects::Snowflake;

use crate::models::ServerModel;

/// Convert ServerModel to Server entity
impl From<ServerModel> for Server {
    fn from(model: ServerModel) -> Self {
        Server {
            id: Snowflake::new(model.id),
            name: model.name,
            image: model.image,
            created_at: model.created_at,
        }
    }
}

//! Message entity <-> model mapper

use chat_core::entities::Message;
use chat_core::value_objects::Snowflake;

use crate::models::MessageModel;

/// Convert MessageModel to Message entity
impl From<MessageModel> for Message {
    fn from(model: MessageModel) -> Self {
        Message {
            id: Snowflake::new(model.id),
            channel_id: Snowflake::new(model.channel_id),
            author_id: model.author_id.map(Snowflake::new),
            body: model.body,
            sent_at: model.sent_at,
            edited_at: model.edited_at,
            deleted_at: model.deleted_at,
        }
    }
}

//! User entity <-> model mapper

use chat_core::entities::{PresenceStatus, User};
use chat_core::value_objects::Snowflake;

use crate::models::UserModel;

/// Convert UserModel to User entity
impl From<UserModel> for User {
    fn from(model: UserModel) -> Self {
        User {
            id: Snowflake::new(model.id),
            username: model.username,
            display_name: model.display_name,
            email: model.email,
            language: model.language,
            status: PresenceStatus::from(model.status),
            bio: model.bio,
            custom_status: model.custom_status,
            pronouns: model.pronouns,
            avatar: model.avatar,
            joined_at: model.joined_at,
            last_seen: model.last_seen,
        }
    }
}

/// Convert User entity reference to values for a full profile write
pub struct UserUpdate<'a> {
    pub id: i64,
    pub username: &'a str,
    pub display_name: Option<&'a str>,
    pub email: Option<&'a str>,
    pub language: &'a str,
    pub bio: Option<&'a str>,
    pub custom_status: Option<&'a str>,
    pub pronouns: Option<&'a str>,
    pub avatar: Option<&'a str>,
}

impl<'a> UserUpdate<'a> {
    pub fn new(user: &'a User) -> Self {
        Self {
            id: user.id.into_inner(),
            username: &user.username,
            display_name: user.display_name.as_deref(),
            email: user.email.as_deref(),
            language: &user.language,
            bio: user.bio.as_deref(),
            custom_status: user.custom_status.as_deref(),
            pronouns: user.pronouns.as_deref(),
            avatar: user.avatar.as_deref(),
        }
    }
}

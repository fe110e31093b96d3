//! User entity - represents a chat user

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::DomainError;
use crate::validation;
use crate::value_objects::{CredentialHash, Snowflake};

/// Presence status, persisted as `SMALLINT`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum PresenceStatus {
    Offline = 0,
    /// Accounts start online
    #[default]
    Online = 1,
    Idle = 2,
    DoNotDisturb = 3,
}

impl PresenceStatus {
    /// Get the numeric value
    #[inline]
    #[must_use]
    pub fn as_i16(self) -> i16 {
        self as i16
    }
}

impl From<i16> for PresenceStatus {
    fn from(value: i16) -> Self {
        match value {
            1 => Self::Online,
            2 => Self::Idle,
            3 => Self::DoNotDisturb,
            _ => Self::Offline,
        }
    }
}

impl From<PresenceStatus> for i16 {
    fn from(status: PresenceStatus) -> Self {
        status as i16
    }
}

/// User entity
///
/// The credential hash is deliberately absent; it is only reachable through
/// `UserRepository::get_password_hash`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub id: Snowflake,
    pub username: String,
    pub display_name: Option<String>,
    pub email: Option<String>,
    pub language: String,
    pub status: PresenceStatus,
    pub bio: Option<String>,
    pub custom_status: Option<String>,
    pub pronouns: Option<String>,
    pub avatar: Option<String>,
    pub joined_at: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
}

impl User {
    /// Display name if set, otherwise the username
    pub fn name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.username)
    }

    #[inline]
    pub fn is_online(&self) -> bool {
        self.status != PresenceStatus::Offline
    }
}

/// Input for `UserRepository::create`
#[derive(Debug, Clone, Validate)]
pub struct NewUser {
    #[validate(
        length(min = 1, max = 32, message = "must be 1-32 characters"),
        custom(function = "validation::no_nul")
    )]
    pub username: String,
    pub password_hash: CredentialHash,
    #[validate(
        length(max = 32, message = "must be at most 32 characters"),
        custom(function = "validation::no_nul")
    )]
    pub display_name: Option<String>,
    #[validate(
        length(max = 254, message = "must be at most 254 characters"),
        email(message = "must be a valid email address"),
        custom(function = "validation::no_nul")
    )]
    pub email: Option<String>,
    #[validate(
        length(min = 1, max = 16, message = "must be 1-16 characters"),
        custom(function = "validation::no_nul")
    )]
    pub language: Option<String>,
    #[validate(
        length(max = 512, message = "must be at most 512 characters"),
        custom(function = "validation::no_nul")
    )]
    pub avatar: Option<String>,
}

impl NewUser {
    pub fn new(username: impl Into<String>, password_hash: CredentialHash) -> Self {
        Self {
            username: username.into(),
            password_hash,
            display_name: None,
            email: None,
            language: None,
            avatar: None,
        }
    }

    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn with_avatar(mut self, avatar: impl Into<String>) -> Self {
        self.avatar = Some(avatar.into());
        self
    }

    /// Trim every field, check it and return the normalized input
    pub fn validated(self) -> Result<Self, DomainError> {
        let input = Self {
            username: validation::trim(&self.username),
            password_hash: self.password_hash,
            display_name: validation::trim_optional(self.display_name),
            email: validation::trim_optional(self.email),
            language: self.language.map(|language| validation::trim(&language)),
            avatar: validation::trim_optional(self.avatar),
        };
        validation::check(&input)?;
        Ok(input)
    }
}

/// Partial profile update
///
/// `None` leaves a field untouched. For nullable fields `Some(None)` clears
/// the value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Validate)]
pub struct ProfileUpdate {
    #[validate(
        length(min = 1, max = 32, message = "must be 1-32 characters"),
        custom(function = "validation::no_nul")
    )]
    pub username: Option<String>,
    #[validate(
        length(max = 32, message = "must be at most 32 characters"),
        custom(function = "validation::no_nul")
    )]
    pub display_name: Option<Option<String>>,
    #[validate(
        length(max = 254, message = "must be at most 254 characters"),
        email(message = "must be a valid email address"),
        custom(function = "validation::no_nul")
    )]
    pub email: Option<Option<String>>,
    #[validate(
        length(min = 1, max = 16, message = "must be 1-16 characters"),
        custom(function = "validation::no_nul")
    )]
    pub language: Option<String>,
    #[validate(
        length(max = 190, message = "must be at most 190 characters"),
        custom(function = "validation::no_nul")
    )]
    pub bio: Option<Option<String>>,
    #[validate(
        length(max = 128, message = "must be at most 128 characters"),
        custom(function = "validation::no_nul")
    )]
    pub custom_status: Option<Option<String>>,
    #[validate(
        length(max = 40, message = "must be at most 40 characters"),
        custom(function = "validation::no_nul")
    )]
    pub pronouns: Option<Option<String>>,
    #[validate(
        length(max = 512, message = "must be at most 512 characters"),
        custom(function = "validation::no_nul")
    )]
    pub avatar: Option<Option<String>>,
}

impl ProfileUpdate {
    /// True if applying this update changes nothing
    pub fn is_empty(&self) -> bool {
        self.username.is_none()
            && self.display_name.is_none()
            && self.email.is_none()
            && self.language.is_none()
            && self.bio.is_none()
            && self.custom_status.is_none()
            && self.pronouns.is_none()
            && self.avatar.is_none()
    }

    pub fn validated(self) -> Result<Self, DomainError> {
        let trim_required = |value: Option<String>| value.map(|v| validation::trim(&v));

        let input = Self {
            username: trim_required(self.username),
            display_name: validation::trim_nullable(self.display_name),
            email: validation::trim_nullable(self.email),
            language: trim_required(self.language),
            bio: validation::trim_nullable(self.bio),
            custom_status: validation::trim_nullable(self.custom_status),
            pronouns: validation::trim_nullable(self.pronouns),
            avatar: validation::trim_nullable(self.avatar),
        };
        validation::check(&input)?;
        Ok(input)
    }

    /// Apply the specified fields to `user`
    pub fn apply(self, user: &mut User) {
        if let Some(username) = self.username {
            user.username = username;
        }
        if let Some(display_name) = self.display_name {
            user.display_name = display_name;
        }
        if let Some(email) = self.email {
            user.email = email;
        }
        if let Some(language) = self.language {
            user.language = language;
        }
        if let Some(bio) = self.bio {
            user.bio = bio;
        }
        if let Some(custom_status) = self.custom_status {
            user.custom_status = custom_status;
        }
        if let Some(pronouns) = self.pronouns {
            user.pronouns = pronouns;
        }
        if let Some(avatar) = self.avatar {
            user.avatar = avatar;
        }
    }
}

/// What `UserRepository::delete` removed or rewrote
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct UserDeletion {
    pub memberships_removed: u64,
    pub messages_tombstoned: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    const HASH: &str = "$argon2id$v=19$m=19456,t=2,p=1$c2FsdHNhbHQ$aGFzaGhhc2hoYXNo";

    fn sample_user() -> User {
        let now = Utc::now();
        User {
            id: Snowflake::new(1),
            username: "alice".to_string(),
            display_name: None,
            email: None,
            language: "en".to_string(),
            status: PresenceStatus::Online,
            bio: Some("hello".to_string()),
            custom_status: None,
            pronouns: None,
            avatar: None,
            joined_at: now,
            last_seen: now,
        }
    }

    #[test]
    fn test_presence_roundtrip_through_smallint() {
        for status in [
            PresenceStatus::Offline,
            PresenceStatus::Online,
            PresenceStatus::Idle,
            PresenceStatus::DoNotDisturb,
        ] {
            assert_eq!(PresenceStatus::from(status.as_i16()), status);
        }
        assert_eq!(PresenceStatus::from(42), PresenceStatus::Offline);
        assert_eq!(PresenceStatus::default(), PresenceStatus::Online);
    }

    #[test]
    fn test_new_user_validation_normalizes() {
        let input = NewUser::new("  bob  ", CredentialHash::new(HASH).unwrap())
            .with_email("bob@example.com")
            .with_display_name("   ");

        let valid = input.validated().unwrap();
        assert_eq!(valid.username, "bob");
        assert_eq!(valid.display_name, None);
        assert_eq!(valid.email.as_deref(), Some("bob@example.com"));
    }

    #[test]
    fn test_new_user_rejects_empty_username() {
        let err = NewUser::new(" ", CredentialHash::new(HASH).unwrap())
            .validated()
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidField { field: "username", .. }));
    }

    #[test]
    fn test_profile_update_apply_and_clear() {
        let mut user = sample_user();
        let update = ProfileUpdate {
            display_name: Some(Some("Alice".to_string())),
            bio: Some(None),
            ..Default::default()
        };

        update.validated().unwrap().apply(&mut user);
        assert_eq!(user.display_name.as_deref(), Some("Alice"));
        assert_eq!(user.bio, None);
        assert_eq!(user.username, "alice");
        assert_eq!(user.name(), "Alice");
    }

    #[test]
    fn test_profile_update_limits() {
        let update = ProfileUpdate {
            pronouns: Some(Some("p".repeat(41))),
            ..Default::default()
        };
        assert!(update.validated().unwrap_err().is_validation());

        let update = ProfileUpdate {
            email: Some(Some("nope".to_string())),
            ..Default::default()
        };
        let err = update.validated().unwrap_err();
        assert!(matches!(err, DomainError::InvalidField { field: "email", .. }));

        assert!(ProfileUpdate::default().is_empty());
    }

    #[test]
    fn test_nul_characters_rejected() {
        let err = NewUser::new("bad\0name", CredentialHash::new(HASH).unwrap())
            .validated()
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidField { field: "username", .. }));

        let update = ProfileUpdate {
            bio: Some(Some("line\0".to_string())),
            ..Default::default()
        };
        let err = update.validated().unwrap_err();
        assert!(matches!(err, DomainError::InvalidField { field: "bio", .. }));
    }
}

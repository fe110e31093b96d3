//! Membership entity <-> model mapper

use chat_core::entities::{Member, Membership, PresenceStatus, User};
use chat_core::value_objects::Snowflake;

use crate::models::{MemberModel, MembershipModel};

/// Convert MembershipModel to Membership entity
impl From<MembershipModel> for Membership {
    fn from(model: MembershipModel) -> Self {
        Membership {
            id: Snowflake::new(model.id),
            server_id: Snowflake::new(model.server_id),
            user_id: Snowflake::new(model.user_id),
            owner: model.owner,
            joined_at: model.joined_at,
        }
    }
}

/// Split a joined member row into its membership and user halves
impl From<MemberModel> for Member {
    fn from(model: MemberModel) -> Self {
        Member {
            membership: Membership {
                id: Snowflake::new(model.id),
                server_id: Snowflake::new(model.server_id),
                user_id: Snowflake::new(model.user_id),
                owner: model.owner,
                joined_at: model.joined_at,
            },
            user: User {
                id: Snowflake::new(model.user_id),
                username: model.username,
                display_name: model.display_name,
                email: model.email,
                language: model.language,
                status: PresenceStatus::from(model.status),
                bio: model.bio,
                custom_status: model.custom_status,
                pronouns: model.pronouns,
                avatar: model.avatar,
                joined_at: model.user_joined_at,
                last_seen: model.last_seen,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    #[test]
    fn test_member_split_keeps_both_timestamps() {
        let account_created = Utc::now() - Duration::days(30);
        let joined = Utc::now();

        let member = Member::from(MemberModel {
            id: 10,
            server_id: 20,
            user_id: 30,
            owner: true,
            joined_at: joined,
            username: "bob".to_string(),
            display_name: Some("Bob".to_string()),
            email: None,
            language: "de".to_string(),
            status: 0,
            bio: None,
            custom_status: None,
            pronouns: Some("he/him".to_string()),
            avatar: None,
            user_joined_at: account_created,
            last_seen: account_created,
        });

        assert_eq!(member.membership.joined_at, joined);
        assert_eq!(member.user.joined_at, account_created);
        assert_eq!(member.user.id, member.membership.user_id);
        assert_eq!(member.user.status, PresenceStatus::Offline);
        assert!(member.membership.owner);
        assert_eq!(member.cursor().id, Snowflake::new(10));
    }
}

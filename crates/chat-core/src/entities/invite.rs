//! Invite entity - represents an invite code for a server

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::value_objects::Snowflake;

/// Invite entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Invite {
    pub code: String,
    pub server_id: Snowflake,
    pub creator_id: Option<Snowflake>,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Invite {
    /// Default lifetime of a new invite
    pub const DEFAULT_TTL_DAYS: i64 = 7;

    /// Length of generated codes
    pub const CODE_LEN: usize = 8;

    /// Expiry for an invite created at `created_at` with the given TTL
    pub fn expiry_from(created_at: DateTime<Utc>, ttl: Duration) -> DateTime<Utc> {
        created_at + ttl
    }

    /// Check if invite is expired at `now`
    #[inline]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Check if invite is expired
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }
}

/// Generate a cryptographically secure random invite code
pub fn generate_invite_code() -> String {
    use rand::Rng;

    const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

    let mut rng = rand::thread_rng();
    (0..Invite::CODE_LEN)
        .map(|_| CHARSET[rng.gen_range(0..CHARSET.len())] as char)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn invite(created_at: DateTime<Utc>) -> Invite {
        Invite {
            code: "abcd1234".to_string(),
            server_id: Snowflake::new(100),
            creator_id: Some(Snowflake::new(300)),
            created_at,
            expires_at: Invite::expiry_from(created_at, Duration::days(Invite::DEFAULT_TTL_DAYS)),
        }
    }

    #[test]
    fn test_invite_expiry() {
        let now = Utc::now();
        let invite = invite(now);

        assert!(!invite.is_expired_at(now));
        assert!(!invite.is_expired_at(now + Duration::days(6)));
        assert!(invite.is_expired_at(now + Duration::days(7)));
        assert!(!invite.is_expired());
    }

    #[test]
    fn test_generate_invite_code() {
        let code1 = generate_invite_code();
        let code2 = generate_invite_code();

        assert_eq!(code1.len(), 8);
        assert_eq!(code2.len(), 8);
        // Codes should be alphanumeric
        assert!(code1.chars().all(|c| c.is_ascii_alphanumeric()));
    }
}

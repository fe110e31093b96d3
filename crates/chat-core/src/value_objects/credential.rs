//! Stored credential hash

use std::fmt;

use argon2::password_hash::PasswordHash;

use crate::error::DomainError;

/// Salted password hash in PHC string format (`$argon2id$v=19$...`)
///
/// The store only persists and returns this value; producing and comparing
/// hashes belongs to the auth layer. `Debug` never prints the hash.
#[derive(Clone, PartialEq, Eq)]
pub struct CredentialHash(String);

impl CredentialHash {
    /// Column width of `users.password_hash`
    pub const MAX_LEN: usize = 255;

    /// Wrap an already-hashed credential
    ///
    /// The value must parse as a PHC string; the algorithm is not checked here.
    pub fn new(hash: impl Into<String>) -> Result<Self, DomainError> {
        let hash = hash.into();

        if hash.len() > Self::MAX_LEN {
            return Err(DomainError::invalid_field(
                "password_hash",
                format!("must be at most {} bytes", Self::MAX_LEN),
            ));
        }
        if let Err(e) = PasswordHash::new(&hash) {
            return Err(DomainError::invalid_field(
                "password_hash",
                format!("must be a PHC-format hash ({e})"),
            ));
        }

        Ok(Self(hash))
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[inline]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Debug for CredentialHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CredentialHash(<redacted>)")
    }
}

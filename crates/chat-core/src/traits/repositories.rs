//! Repository traits (ports) - define the interface for data access
//!
//! These traits follow the Repository pattern from Domain-Driven Design.
//! The domain layer defines what it needs, and the infrastructure layer
//! provides the implementation.

use std::collections::VecDeque;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::stream::{self, BoxStream, StreamExt};

use crate::entities::{
    Channel, Invite, Member, Membership, Message, NewChannel, NewMessage, NewServer, NewUser,
    PresenceStatus, ProfileUpdate, Server, ServerDeletion, ServerUpdate, User, UserDeletion,
};
use crate::error::DomainError;
use crate::value_objects::{CredentialHash, Page, PageCursor, PageRequest, Snowflake};

/// Result type for repository operations
pub type RepoResult<T> = Result<T, DomainError>;

// ============================================================================
// User Repository
// ============================================================================

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Create a new user
    async fn create(&self, user: NewUser) -> RepoResult<User>;

    /// Find user by ID
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<User>>;

    /// Get user by ID, failing with `UserNotFound`
    async fn get(&self, id: Snowflake) -> RepoResult<User> {
        self.find_by_id(id)
            .await?
            .ok_or(DomainError::UserNotFound(id))
    }

    /// Find user by username
    async fn find_by_username(&self, username: &str) -> RepoResult<Option<User>>;

    /// Get password hash for authentication
    async fn get_password_hash(&self, id: Snowflake) -> RepoResult<CredentialHash>;

    /// Update password hash
    async fn update_password(&self, id: Snowflake, password_hash: &CredentialHash)
        -> RepoResult<()>;

    /// Apply a partial profile update
    async fn update_profile(&self, id: Snowflake, update: ProfileUpdate) -> RepoResult<User>;

    async fn update_last_seen(&self, id: Snowflake, at: DateTime<Utc>) -> RepoResult<()>;

    /// Set presence; going offline also stamps `last_seen`
    async fn set_presence(&self, id: Snowflake, status: PresenceStatus) -> RepoResult<()>;

    /// Delete a user, keeping their messages with the author cleared
    async fn delete(&self, id: Snowflake) -> RepoResult<UserDeletion>;
}

// ============================================================================
// Server Repository
// ============================================================================

#[async_trait]
pub trait ServerRepository: Send + Sync {
    /// Create a server together with its owner membership
    async fn create(&self, server: NewServer) -> RepoResult<Server>;

    /// Find server by ID
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Server>>;

    async fn get(&self, id: Snowflake) -> RepoResult<Server> {
        self.find_by_id(id)
            .await?
            .ok_or(DomainError::ServerNotFound(id))
    }

    /// List all servers a user is a member of, oldest membership first
    async fn list_for_user(&self, user_id: Snowflake) -> RepoResult<Vec<Server>>;

    /// Update an existing server
    async fn update(&self, id: Snowflake, update: ServerUpdate) -> RepoResult<Server>;

    /// Delete a server and everything it owns
    async fn delete(&self, id: Snowflake) -> RepoResult<ServerDeletion>;
}

// ============================================================================
// Membership Repository
// ============================================================================

#[async_trait]
pub trait MembershipRepository: Send + Sync {
    /// Add a user to a server as a regular member
    async fn join(&self, server_id: Snowflake, user_id: Snowflake) -> RepoResult<Membership>;

    /// Remove a user from a server; the last owner cannot leave
    async fn leave(&self, server_id: Snowflake, user_id: Snowflake) -> RepoResult<()>;

    /// Grant or revoke ownership
    async fn set_owner(
        &self,
        server_id: Snowflake,
        user_id: Snowflake,
        owner: bool,
    ) -> RepoResult<Membership>;

    async fn find(&self, server_id: Snowflake, user_id: Snowflake)
        -> RepoResult<Option<Membership>>;

    async fn get(&self, server_id: Snowflake, user_id: Snowflake) -> RepoResult<Membership> {
        self.find(server_id, user_id)
            .await?
            .ok_or(DomainError::MembershipNotFound { server_id, user_id })
    }

    /// Check if a user is a member of a server
    async fn is_member(&self, server_id: Snowflake, user_id: Snowflake) -> RepoResult<bool>;

    /// List members in join order
    async fn list_members(&self, server_id: Snowflake, page: PageRequest)
        -> RepoResult<Page<Member>>;
}

// ============================================================================
// Channel Repository
// ============================================================================

#[async_trait]
pub trait ChannelRepository: Send + Sync {
    /// Create a new channel
    async fn create(&self, channel: NewChannel) -> RepoResult<Channel>;

    /// Find channel by ID
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Channel>>;

    async fn get(&self, id: Snowflake) -> RepoResult<Channel> {
        self.find_by_id(id)
            .await?
            .ok_or(DomainError::ChannelNotFound(id))
    }

    /// List all channels in a server, oldest first
    async fn list_by_server(&self, server_id: Snowflake) -> RepoResult<Vec<Channel>>;

    /// Delete a channel; returns the number of messages removed with it
    async fn delete(&self, id: Snowflake) -> RepoResult<u64>;
}

// ============================================================================
// Message Repository
// ============================================================================

#[async_trait]
pub trait MessageRepository: Send + Sync {
    /// Post a new message
    async fn post(&self, message: NewMessage) -> RepoResult<Message>;

    /// Find message by ID; deleted messages are not returned
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Message>>;

    async fn get(&self, id: Snowflake) -> RepoResult<Message> {
        self.find_by_id(id)
            .await?
            .ok_or(DomainError::MessageNotFound(id))
    }

    /// List messages in a channel after `after`, oldest first
    ///
    /// `limit` is clamped to `1..=MAX_PAGE_SIZE`.
    async fn list(
        &self,
        channel_id: Snowflake,
        after: Option<PageCursor>,
        limit: i64,
    ) -> RepoResult<Page<Message>>;

    /// Replace the body of a message
    async fn edit(&self, id: Snowflake, body: &str) -> RepoResult<Message>;

    /// Soft delete a message
    async fn delete(&self, id: Snowflake) -> RepoResult<()>;

    /// Lazily walk a channel page by page
    ///
    /// The stream ends after the last page, or right after yielding the first
    /// error. Resuming from the cursor of the last yielded message continues
    /// where it stopped.
    fn stream(
        &self,
        channel_id: Snowflake,
        after: Option<PageCursor>,
        page_size: i64,
    ) -> BoxStream<'_, RepoResult<Message>> {
        stream::unfold(
            (after, VecDeque::new(), false),
            move |(mut cursor, mut buffer, mut done)| async move {
                loop {
                    if let Some(message) = buffer.pop_front() {
                        return Some((Ok(message), (cursor, buffer, done)));
                    }
                    if done {
                        return None;
                    }
                    match self.list(channel_id, cursor, page_size).await {
                        Ok(page) => {
                            done = !page.has_more;
                            cursor = page.next_cursor;
                            buffer.extend(page.items);
                        }
                        Err(err) => return Some((Err(err), (cursor, buffer, true))),
                    }
                }
            },
        )
        .boxed()
    }
}

/// Largest page `MessageRepository::list` returns
pub const MAX_PAGE_SIZE: i64 = 100;

// ============================================================================
// Invite Repository
// ============================================================================

#[async_trait]
pub trait InviteRepository: Send + Sync {
    /// Create an invite with a fresh random code
    async fn create(&self, server_id: Snowflake, creator_id: Option<Snowflake>)
        -> RepoResult<Invite>;

    /// Find invite by code
    async fn find_by_code(&self, code: &str) -> RepoResult<Option<Invite>>;

    /// Join the invite's server
    async fn redeem(&self, code: &str, user_id: Snowflake) -> RepoResult<Membership>;

    /// Delete an invite
    async fn delete(&self, code: &str) -> RepoResult<()>;

    /// Delete every invite expired at `now`; returns the count removed
    async fn delete_expired(&self, now: DateTime<Utc>) -> RepoResult<u64>;
}

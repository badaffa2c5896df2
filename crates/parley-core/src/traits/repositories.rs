//! Repository traits (ports) - define the interface for data access
//!
//! The domain layer defines what it needs; the infrastructure layer provides
//! the implementation. The gateway consumes these traits read-mostly: all
//! writes to memberships and channels happen on the REST side, and the only
//! write issued from the real-time core is the user online flag.

use async_trait::async_trait;

use crate::entities::{Channel, User};
use crate::error::DomainError;
use crate::value_objects::Snowflake;

/// Result type for repository operations
pub type RepoResult<T> = Result<T, DomainError>;

// ============================================================================
// User Repository
// ============================================================================

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find user by ID
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<User>>;

    /// Persist the online/offline flag
    async fn set_online(&self, id: Snowflake, online: bool) -> RepoResult<()>;
}

// ============================================================================
// Member Repository
// ============================================================================

#[async_trait]
pub trait MemberRepository: Send + Sync {
    /// Check whether a membership row exists for (guild, user)
    async fn is_member(&self, guild_id: Snowflake, user_id: Snowflake) -> RepoResult<bool>;

    /// List the ids of every guild the user belongs to
    async fn guild_ids_for_user(&self, user_id: Snowflake) -> RepoResult<Vec<Snowflake>>;
}

// ============================================================================
// Channel Repository
// ============================================================================

#[async_trait]
pub trait ChannelRepository: Send + Sync {
    /// Find channel by ID
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Channel>>;

    /// Check whether an allow-list row exists for (channel, user)
    ///
    /// Covers both private channels and DM participants.
    async fn is_channel_member(
        &self,
        channel_id: Snowflake,
        user_id: Snowflake,
    ) -> RepoResult<bool>;
}

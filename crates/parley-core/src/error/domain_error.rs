//! Domain errors - error types for the domain layer

use thiserror::Error;

use crate::value_objects::Snowflake;

/// Domain layer errors
#[derive(Debug, Error)]
pub enum DomainError {
    // =========================================================================
    // Not Found Errors
    // =========================================================================
    #[error("User not found: {0}")]
    UserNotFound(Snowflake),

    #[error("Guild not found: {0}")]
    GuildNotFound(Snowflake),

    #[error("Channel not found: {0}")]
    ChannelNotFound(Snowflake),

    #[error("Member not found in guild")]
    MemberNotFound,

    // =========================================================================
    // Validation Errors
    // =========================================================================
    #[error("Validation error: {0}")]
    ValidationError(String),

    // =========================================================================
    // Conflict Errors
    // =========================================================================
    #[error("Already a member of this guild")]
    AlreadyMember,

    #[error("Already a member of this channel")]
    AlreadyChannelMember,

    // =========================================================================
    // Infrastructure Errors (wrapped)
    // =========================================================================
    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl DomainError {
    /// Check if the error is a not-found variant
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::UserNotFound(_)
                | Self::GuildNotFound(_)
                | Self::ChannelNotFound(_)
                | Self::MemberNotFound
        )
    }
}

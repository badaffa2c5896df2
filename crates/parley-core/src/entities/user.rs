//! User entity - represents a chat user

use chrono::{DateTime, Utc};

use crate::value_objects::Snowflake;

/// User account
///
/// The gateway only ever mutates `is_online`; everything else is managed by
/// the REST side. Users are never hard-deleted while messages reference them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: Snowflake,
    pub username: String,
    pub avatar: Option<String>,
    pub is_online: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new User with required fields
    pub fn new(id: Snowflake, username: String) -> Self {
        let now = Utc::now();
        Self {
            id,
            username,
            avatar: None,
            is_online: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Flip the online flag
    pub fn set_online(&mut self, online: bool) {
        self.is_online = online;
        self.updated_at = Utc::now();
    }

    /// Get avatar URL or the default avatar
    pub fn avatar_url(&self) -> String {
        match &self.avatar {
            Some(hash) => format!("/avatars/{}/{}.png", self.id, hash),
            None => "/embed/avatars/default.png".to_string(),
        }
    }
}

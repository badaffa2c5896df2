//! In-memory repository fakes
//!
//! One [`FakeStore`] implements every repository trait the gateway needs, so
//! a test seeds users, memberships, and channels, then hands the same Arc to
//! the state constructor three times.

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use parley_core::entities::{Channel, ChannelKind, User};
use parley_core::{
    ChannelRepository, DomainError, MemberRepository, RepoResult, Snowflake, UserRepository,
};

/// In-memory store backing all three repository traits
#[derive(Default)]
pub struct FakeStore {
    users: Mutex<Vec<User>>,
    memberships: Mutex<Vec<(i64, i64)>>,
    channels: Mutex<Vec<Channel>>,
    channel_members: Mutex<Vec<(i64, i64)>>,
    online_log: Mutex<Vec<(i64, bool)>>,
}

impl FakeStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a user
    pub fn add_user(&self, id: i64, username: &str) {
        self.users
            .lock()
            .push(User::new(Snowflake::new(id), username.to_string()));
    }

    /// Seed a guild membership
    pub fn add_membership(&self, guild_id: i64, user_id: i64) {
        self.memberships.lock().push((guild_id, user_id));
    }

    /// Seed a public channel
    pub fn add_public_channel(&self, channel_id: i64, guild_id: i64, name: &str) {
        let now = Utc::now();
        self.channels.lock().push(Channel {
            id: Snowflake::new(channel_id),
            guild_id: Snowflake::new(guild_id),
            name: name.to_string(),
            kind: ChannelKind::Public,
            position: 0,
            created_at: now,
            updated_at: now,
        });
    }

    /// Seed a private channel with explicit members
    pub fn add_private_channel(&self, channel_id: i64, guild_id: i64, members: &[i64]) {
        let now = Utc::now();
        self.channels.lock().push(Channel {
            id: Snowflake::new(channel_id),
            guild_id: Snowflake::new(guild_id),
            name: format!("private-{channel_id}"),
            kind: ChannelKind::Private,
            position: 0,
            created_at: now,
            updated_at: now,
        });
        let mut channel_members = self.channel_members.lock();
        for user_id in members {
            channel_members.push((channel_id, *user_id));
        }
    }

    /// Every `set_online` call the gateway has made, in order
    #[must_use]
    pub fn online_log(&self) -> Vec<(i64, bool)> {
        self.online_log.lock().clone()
    }
}

#[async_trait]
impl UserRepository for FakeStore {
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<User>> {
        Ok(self.users.lock().iter().find(|u| u.id == id).cloned())
    }

    async fn set_online(&self, id: Snowflake, online: bool) -> RepoResult<()> {
        let mut users = self.users.lock();
        let Some(user) = users.iter_mut().find(|u| u.id == id) else {
            return Err(DomainError::UserNotFound(id));
        };
        user.set_online(online);
        self.online_log.lock().push((id.into_inner(), online));
        Ok(())
    }
}

#[async_trait]
impl MemberRepository for FakeStore {
    async fn is_member(&self, guild_id: Snowflake, user_id: Snowflake) -> RepoResult<bool> {
        Ok(self
            .memberships
            .lock()
            .contains(&(guild_id.into_inner(), user_id.into_inner())))
    }

    async fn guild_ids_for_user(&self, user_id: Snowflake) -> RepoResult<Vec<Snowflake>> {
        Ok(self
            .memberships
            .lock()
            .iter()
            .filter(|(_, uid)| *uid == user_id.into_inner())
            .map(|(gid, _)| Snowflake::new(*gid))
            .collect())
    }
}

#[async_trait]
impl ChannelRepository for FakeStore {
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Channel>> {
        Ok(self.channels.lock().iter().find(|c| c.id == id).cloned())
    }

    async fn is_channel_member(
        &self,
        channel_id: Snowflake,
        user_id: Snowflake,
    ) -> RepoResult<bool> {
        Ok(self
            .channel_members
            .lock()
            .contains(&(channel_id.into_inner(), user_id.into_inner())))
    }
}

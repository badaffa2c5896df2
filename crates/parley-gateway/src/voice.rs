//! Voice signaling relay
//!
//! Tracks who is "in voice" per guild and relays WebRTC negotiation payloads
//! between exactly two peers. The roster is separate from the chat room
//! registry: being in a guild room says nothing about being in its voice
//! room. The relay never inspects signaling payloads.

use crate::protocol::{ServerEvent, VoiceRosterPayload};
use crate::registry::ConnectionRegistry;
use dashmap::DashMap;
use parley_core::Snowflake;
use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;

/// Guild-scoped voice rosters plus the signaling relay
pub struct VoiceRelay {
    /// Guild ID to the set of users currently in its voice room
    rosters: DashMap<Snowflake, HashSet<Snowflake>>,

    registry: Arc<ConnectionRegistry>,
}

impl VoiceRelay {
    /// Create a new relay delivering through the given registry
    #[must_use]
    pub fn new(registry: Arc<ConnectionRegistry>) -> Self {
        Self {
            rosters: DashMap::new(),
            registry,
        }
    }

    /// Add a user to a guild's voice roster and announce the new roster
    ///
    /// The announcement goes to every roster member including the newcomer,
    /// so all sides see the same peer list and begin negotiation.
    pub async fn join(&self, user_id: Snowflake, guild_id: Snowflake) {
        self.rosters.entry(guild_id).or_default().insert(user_id);

        let roster = self.roster(guild_id);
        tracing::debug!(
            user_id = %user_id,
            guild_id = %guild_id,
            roster_size = roster.len(),
            "User joined voice"
        );

        let event = ServerEvent::join_voice(&VoiceRosterPayload {
            clients: roster.clone(),
            user_id,
        });
        self.announce(&roster, event).await;
    }

    /// Remove a user from a guild's voice roster and announce the new roster
    ///
    /// The departing user is announced to as well, so their client tears down
    /// its peer connections.
    pub async fn leave(&self, user_id: Snowflake, guild_id: Snowflake) {
        let was_present = self
            .rosters
            .get_mut(&guild_id)
            .is_some_and(|mut roster| roster.remove(&user_id));
        self.rosters.retain(|_, roster| !roster.is_empty());

        if !was_present {
            return;
        }

        let roster = self.roster(guild_id);
        tracing::debug!(
            user_id = %user_id,
            guild_id = %guild_id,
            roster_size = roster.len(),
            "User left voice"
        );

        let event = ServerEvent::leave_voice(&VoiceRosterPayload {
            clients: roster.clone(),
            user_id,
        });

        let mut recipients = roster;
        recipients.push(user_id);
        self.announce(&recipients, event).await;
    }

    /// Forward a signaling payload to exactly one peer
    ///
    /// Both sender and target must be on the guild's roster; anything else is
    /// silently dropped. The payload is not inspected.
    pub async fn relay(
        &self,
        from: Snowflake,
        guild_id: Snowflake,
        target: Snowflake,
        payload: Value,
    ) {
        let authorized = self
            .rosters
            .get(&guild_id)
            .is_some_and(|roster| roster.contains(&from) && roster.contains(&target));

        if !authorized {
            tracing::debug!(
                from = %from,
                target = %target,
                guild_id = %guild_id,
                "Dropping signal between users not in voice"
            );
            return;
        }

        self.registry
            .send_to_user(target, ServerEvent::voice_signal(payload))
            .await;
    }

    /// Remove a user from every roster they appear on
    ///
    /// Called when a user's last connection closes; each affected guild gets
    /// the same announcement an explicit leave would have produced.
    pub async fn reap_user(&self, user_id: Snowflake) {
        let guilds: Vec<Snowflake> = self
            .rosters
            .iter()
            .filter(|entry| entry.value().contains(&user_id))
            .map(|entry| *entry.key())
            .collect();

        for guild_id in guilds {
            self.leave(user_id, guild_id).await;
        }
    }

    /// Sorted snapshot of a guild's voice roster
    #[must_use]
    pub fn roster(&self, guild_id: Snowflake) -> Vec<Snowflake> {
        let mut roster: Vec<Snowflake> = self
            .rosters
            .get(&guild_id)
            .map(|r| r.iter().copied().collect())
            .unwrap_or_default();
        roster.sort_unstable_by_key(|id| id.into_inner());
        roster
    }

    async fn announce(&self, recipients: &[Snowflake], event: ServerEvent) {
        for user_id in recipients {
            self.registry.send_to_user(*user_id, event.clone()).await;
        }
    }
}

impl std::fmt::Debug for VoiceRelay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VoiceRelay")
            .field("rosters", &self.rosters.len())
            .finish()
    }
}

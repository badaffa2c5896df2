//! Shared gateway state
//!
//! One instance per process, cloned cheaply into each request handler.

use crate::directory::RoomDirectory;
use crate::emit::GatewayHandle;
use crate::presence::PresencePublisher;
use crate::registry::ConnectionRegistry;
use crate::router::EventRouter;
use crate::voice::VoiceRelay;
use parley_common::SessionTokens;
use parley_core::{ChannelRepository, MemberRepository, UserRepository};
use std::sync::Arc;

/// Shared state for the gateway server
#[derive(Clone)]
pub struct GatewayState {
    registry: Arc<ConnectionRegistry>,
    directory: Arc<RoomDirectory>,
    voice: Arc<VoiceRelay>,
    presence: Arc<PresencePublisher>,
    router: Arc<EventRouter>,
    tokens: Arc<SessionTokens>,
    users: Arc<dyn UserRepository>,
}

impl GatewayState {
    /// Wire up gateway state from its repositories and token service
    pub fn new(
        users: Arc<dyn UserRepository>,
        members: Arc<dyn MemberRepository>,
        channels: Arc<dyn ChannelRepository>,
        tokens: Arc<SessionTokens>,
    ) -> Self {
        let registry = ConnectionRegistry::new_shared();
        let directory = Arc::new(RoomDirectory::new(members, channels));
        let voice = Arc::new(VoiceRelay::new(registry.clone()));
        let presence = Arc::new(PresencePublisher::new(
            users.clone(),
            directory.clone(),
            registry.clone(),
        ));
        let router = Arc::new(EventRouter::new(
            registry.clone(),
            directory.clone(),
            voice.clone(),
            presence.clone(),
        ));

        Self {
            registry,
            directory,
            voice,
            presence,
            router,
            tokens,
            users,
        }
    }

    /// Connection registry
    #[must_use]
    pub fn registry(&self) -> &Arc<ConnectionRegistry> {
        &self.registry
    }

    /// Room directory
    #[must_use]
    pub fn directory(&self) -> &Arc<RoomDirectory> {
        &self.directory
    }

    /// Voice relay
    #[must_use]
    pub fn voice(&self) -> &Arc<VoiceRelay> {
        &self.voice
    }

    /// Presence publisher
    #[must_use]
    pub fn presence(&self) -> &Arc<PresencePublisher> {
        &self.presence
    }

    /// Event router
    #[must_use]
    pub fn router(&self) -> &Arc<EventRouter> {
        &self.router
    }

    /// Session token validator
    #[must_use]
    pub fn tokens(&self) -> &Arc<SessionTokens> {
        &self.tokens
    }

    /// User repository
    #[must_use]
    pub fn users(&self) -> &Arc<dyn UserRepository> {
        &self.users
    }

    /// Broadcast facade for REST-side domain services
    #[must_use]
    pub fn handle(&self) -> GatewayHandle {
        GatewayHandle::new(self.registry.clone())
    }
}

impl std::fmt::Debug for GatewayState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayState")
            .field("connections", &self.registry.connection_count())
            .finish()
    }
}

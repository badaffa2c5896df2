//! # parley-gateway
//!
//! WebSocket gateway for real-time bidirectional communication: room-scoped
//! fan-out, typing indicators, presence, and WebRTC voice signaling.
//!
//! The gateway sits beside the REST API. Clients hold one persistent
//! connection each; REST-side domain services announce their mutations
//! through an injected [`emit::GatewayHandle`] rather than any global state.

pub mod directory;
pub mod emit;
pub mod presence;
pub mod protocol;
pub mod registry;
pub mod router;
pub mod server;
pub mod voice;

pub use server::{create_app, run, GatewayState};

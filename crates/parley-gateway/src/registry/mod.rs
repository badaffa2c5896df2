//! Connection registry
//!
//! Tracks live WebSocket connections and their room subscriptions.

mod connection;
#[allow(clippy::module_inception)]
mod registry;

pub use connection::Connection;
pub use registry::ConnectionRegistry;

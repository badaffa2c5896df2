//! Integration test utilities for the gateway
//!
//! Spins up the real WebSocket server over in-memory repositories so tests
//! exercise the full wire path without a database.

pub mod fakes;
pub mod helpers;

pub use fakes::*;
pub use helpers::*;

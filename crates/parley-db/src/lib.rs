//! # parley-db
//!
//! Database layer implementing the `parley-core` repository traits with
//! PostgreSQL via SQLx: connection pool management, `FromRow` models,
//! entity mappers, and repository implementations.
//!
//! The gateway reads memberships and channels through this crate and writes
//! nothing but the user online flag.

pub mod mappers;
pub mod models;
pub mod pool;
pub mod repositories;

// Re-export commonly used types
pub use pool::{create_pool, create_pool_from_env, DatabaseConfig, PgPool};
pub use repositories::{PgChannelRepository, PgMemberRepository, PgUserRepository};

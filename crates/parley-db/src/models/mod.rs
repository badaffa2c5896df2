//! Database models - SQLx-compatible structs for PostgreSQL tables

mod channel;
mod user;

pub use channel::ChannelModel;
pub use user::UserModel;

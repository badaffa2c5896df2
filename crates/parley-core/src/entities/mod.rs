//! Domain entities

mod channel;
mod user;

pub use channel::{Channel, ChannelKind};
pub use user::User;

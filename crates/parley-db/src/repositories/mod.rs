//! PostgreSQL repository implementations

mod channel;
mod error;
mod member;
mod user;

pub use channel::PgChannelRepository;
pub use member::PgMemberRepository;
pub use user::PgUserRepository;

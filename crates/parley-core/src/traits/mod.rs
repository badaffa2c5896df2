//! Repository traits (ports)

mod repositories;

pub use repositories::{ChannelRepository, MemberRepository, RepoResult, UserRepository};

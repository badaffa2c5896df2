//! Value objects - immutable domain primitives

mod room_key;
mod snowflake;

pub use room_key::RoomKey;
pub use snowflake::{Snowflake, SnowflakeGenerator, SnowflakeParseError};

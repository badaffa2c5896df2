//! Channel entity <-> model mapper

use parley_core::entities::{Channel, ChannelKind};
use parley_core::value_objects::Snowflake;

use crate::models::ChannelModel;

impl From<ChannelModel> for Channel {
    fn from(model: ChannelModel) -> Self {
        Channel {
            id: Snowflake::new(model.id),
            guild_id: Snowflake::new(model.guild_id),
            name: model.name,
            kind: ChannelKind::from(model.kind),
            position: model.position,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

//! User entity <-> model mapper

use parley_core::entities::User;
use parley_core::value_objects::Snowflake;

use crate::models::UserModel;

impl From<UserModel> for User {
    fn from(model: UserModel) -> Self {
        User {
            id: Snowflake::new(model.id),
            username: model.username,
            avatar: model.avatar,
            is_online: model.is_online,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

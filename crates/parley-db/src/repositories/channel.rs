//! PostgreSQL implementation of ChannelRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use parley_core::entities::Channel;
use parley_core::traits::{ChannelRepository, RepoResult};
use parley_core::value_objects::Snowflake;

use crate::models::ChannelModel;

use super::error::map_db_error;

/// PostgreSQL implementation of ChannelRepository
#[derive(Clone)]
pub struct PgChannelRepository {
    pool: PgPool,
}

impl PgChannelRepository {
    /// Create a new PgChannelRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ChannelRepository for PgChannelRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Channel>> {
        let result = sqlx::query_as::<_, ChannelModel>(
            r"
            SELECT id, guild_id, name, kind, position, created_at, updated_at, deleted_at
            FROM channels
            WHERE id = $1 AND deleted_at IS NULL
            ",
        )
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(Channel::from))
    }

    #[instrument(skip(self))]
    async fn is_channel_member(
        &self,
        channel_id: Snowflake,
        user_id: Snowflake,
    ) -> RepoResult<bool> {
        let result = sqlx::query_scalar::<_, bool>(
            r"
            SELECT EXISTS(
                SELECT 1 FROM channel_members WHERE channel_id = $1 AND user_id = $2
            )
            ",
        )
        .bind(channel_id.into_inner())
        .bind(user_id.into_inner())
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result)
    }
}

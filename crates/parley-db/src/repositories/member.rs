//! PostgreSQL implementation of MemberRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use parley_core::traits::{MemberRepository, RepoResult};
use parley_core::value_objects::Snowflake;

use super::error::map_db_error;

/// PostgreSQL implementation of MemberRepository
#[derive(Clone)]
pub struct PgMemberRepository {
    pool: PgPool,
}

impl PgMemberRepository {
    /// Create a new PgMemberRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MemberRepository for PgMemberRepository {
    #[instrument(skip(self))]
    async fn is_member(&self, guild_id: Snowflake, user_id: Snowflake) -> RepoResult<bool> {
        let result = sqlx::query_scalar::<_, bool>(
            r"
            SELECT EXISTS(SELECT 1 FROM guild_members WHERE guild_id = $1 AND user_id = $2)
            ",
        )
        .bind(guild_id.into_inner())
        .bind(user_id.into_inner())
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result)
    }

    #[instrument(skip(self))]
    async fn guild_ids_for_user(&self, user_id: Snowflake) -> RepoResult<Vec<Snowflake>> {
        let guild_ids = sqlx::query_scalar::<_, i64>(
            r"
            SELECT guild_id FROM guild_members WHERE user_id = $1 ORDER BY joined_at
            ",
        )
        .bind(user_id.into_inner())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(guild_ids.into_iter().map(Snowflake::new).collect())
    }
}

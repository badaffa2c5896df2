//! Channel database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for the channels table
///
/// `kind` is stored as a smallint (0 public, 1 private, 2 dm).
#[derive(Debug, Clone, FromRow)]
pub struct ChannelModel {
    pub id: i64,
    pub guild_id: i64,
    pub name: String,
    pub kind: i16,
    pub position: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

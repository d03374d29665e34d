use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Author id recorded for pastes saved without a valid token.
///
/// Auto-increment user ids start at 1, so `-1` can never collide with a real
/// account.
pub const ANONYMOUS_AUTHOR: i32 = -1;

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "paste")]
pub struct Model {
    /// Public 16-character identifier, also the blob and cache key.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub title: Option<String>,
    pub language: Option<String>,

    /// Owning user id, or [`ANONYMOUS_AUTHOR`].
    pub author_id: i32,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}

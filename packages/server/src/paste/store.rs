use async_trait::async_trait;
use sea_orm::{ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder, Set};

use crate::entity::paste;

/// A paste's metadata row. Content never lives here.
pub type PasteRecord = paste::Model;

/// Relational store for paste metadata.
#[async_trait]
pub trait MetadataStore: Send + Sync {
    async fn insert(&self, record: PasteRecord) -> Result<(), DbErr>;

    async fn find(&self, id: &str) -> Result<Option<PasteRecord>, DbErr>;

    /// Returns `false` when no row matched.
    async fn delete(&self, id: &str) -> Result<bool, DbErr>;

    /// All pastes owned by `author_id`, newest first.
    async fn list_by_author(&self, author_id: i32) -> Result<Vec<PasteRecord>, DbErr>;
}

pub struct SeaOrmMetadataStore {
    db: DatabaseConnection,
}

impl SeaOrmMetadataStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl MetadataStore for SeaOrmMetadataStore {
    async fn insert(&self, record: PasteRecord) -> Result<(), DbErr> {
        let model = paste::ActiveModel {
            id: Set(record.id),
            title: Set(record.title),
            language: Set(record.language),
            author_id: Set(record.author_id),
            created_at: Set(record.created_at),
        };
        paste::Entity::insert(model)
            .exec_without_returning(&self.db)
            .await?;
        Ok(())
    }

    async fn find(&self, id: &str) -> Result<Option<PasteRecord>, DbErr> {
        paste::Entity::find_by_id(id.to_owned()).one(&self.db).await
    }

    async fn delete(&self, id: &str) -> Result<bool, DbErr> {
        let result = paste::Entity::delete_by_id(id.to_owned())
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected > 0)
    }

    async fn list_by_author(&self, author_id: i32) -> Result<Vec<PasteRecord>, DbErr> {
        paste::Entity::find()
            .filter(paste::Column::AuthorId.eq(author_id))
            .order_by_desc(paste::Column::CreatedAt)
            .all(&self.db)
            .await
    }
}

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use common::cache::ResultCache;
use common::storage::BlobStore;
use serde::{Deserialize, Serialize};
use tokio::time::timeout;
use tracing::{Span, debug, error, info, instrument, warn};

use super::error::{PasteError, StoreOp};
use super::id::PasteId;
use super::store::{MetadataStore, PasteRecord};
use crate::entity::paste::ANONYMOUS_AUTHOR;
use crate::utils::jwt::TokenVerifier;

/// Immutable settings for a [`PasteService`].
#[derive(Debug, Clone, Copy)]
pub struct PasteServiceContext {
    /// Upper bound for every metadata or blob call.
    pub store_timeout: Duration,
    /// Upper bound for every cache call.
    pub cache_timeout: Duration,
    pub cache_ttl: Duration,
}

impl Default for PasteServiceContext {
    fn default() -> Self {
        Self {
            store_timeout: Duration::from_secs(5),
            cache_timeout: Duration::from_secs(1),
            cache_ttl: Duration::from_secs(12 * 60 * 60),
        }
    }
}

/// Input to [`PasteService::save`].
#[derive(Debug, Clone)]
pub struct PasteDraft {
    pub title: Option<String>,
    pub language: Option<String>,
    pub content: String,
}

/// What a reader gets back for a paste. Also the cached representation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasteView {
    pub title: Option<String>,
    pub language: Option<String>,
    pub content: String,
}

/// Paste read/write service.
///
/// Metadata lives in a [`MetadataStore`], content in a [`BlobStore`] under the
/// paste id, and an optional [`ResultCache`] fronts reads. The two stores are
/// never updated atomically: a failed save can leave a metadata row without
/// content, and a failed delete can leave content without a row.
pub struct PasteService {
    ctx: PasteServiceContext,
    metadata: Arc<dyn MetadataStore>,
    blobs: Arc<dyn BlobStore>,
    cache: Option<Arc<dyn ResultCache>>,
    tokens: Arc<dyn TokenVerifier>,
}

impl PasteService {
    pub fn new(
        ctx: PasteServiceContext,
        metadata: Arc<dyn MetadataStore>,
        blobs: Arc<dyn BlobStore>,
        tokens: Arc<dyn TokenVerifier>,
    ) -> Self {
        Self {
            ctx,
            metadata,
            blobs,
            cache: None,
            tokens,
        }
    }

    pub fn with_cache(mut self, cache: Arc<dyn ResultCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Store a new paste and return its id.
    ///
    /// A token that fails verification is not an error: the paste is saved
    /// anonymously.
    #[instrument(skip_all, fields(hash = tracing::field::Empty, author_id = tracing::field::Empty))]
    pub async fn save(&self, token: Option<&str>, draft: PasteDraft) -> Result<PasteId, PasteError> {
        let author_id = match token.map(|t| self.tokens.verify(t)) {
            Some(Ok(identity)) => identity.user_id,
            Some(Err(e)) => {
                warn!(error = %e, "Ignoring invalid token on save, storing anonymously");
                ANONYMOUS_AUTHOR
            }
            None => ANONYMOUS_AUTHOR,
        };

        let id = PasteId::generate();
        let span = Span::current();
        span.record("hash", id.as_str());
        span.record("author_id", author_id);

        let record = PasteRecord {
            id: id.as_str().to_owned(),
            title: draft.title,
            language: draft.language,
            author_id,
            created_at: Utc::now(),
        };
        self.bounded(StoreOp::InsertMetadata, self.metadata.insert(record))
            .await?;

        if let Err(e) = self
            .bounded(
                StoreOp::UploadContent,
                self.blobs.put(id.as_str(), draft.content.as_bytes()),
            )
            .await
        {
            error!(error = %e, "Content upload failed, metadata row left in place");
            return Err(e);
        }

        info!(size = draft.content.len(), "Paste saved");
        Ok(id)
    }

    /// Read a paste, serving from the cache when possible.
    #[instrument(skip_all, fields(hash = %id))]
    pub async fn fetch(&self, id: &str) -> Result<PasteView, PasteError> {
        if let Some(view) = self.cached(id).await {
            debug!("Cache hit");
            return Ok(view);
        }

        let record = self
            .bounded(StoreOp::LookupMetadata, self.metadata.find(id))
            .await?
            .ok_or(PasteError::NotFound)?;

        let bytes = self
            .bounded(StoreOp::DownloadContent, self.blobs.get(id))
            .await?;
        let content = String::from_utf8(bytes)
            .map_err(|e| PasteError::store(StoreOp::DownloadContent, e))?;

        let view = PasteView {
            title: record.title,
            language: record.language,
            content,
        };
        if self.populate(id, &view).await {
            self.drop_if_deleted(id).await;
        }
        Ok(view)
    }

    /// Remove a paste owned by the token's bearer.
    ///
    /// Order is metadata row, then content, then cache entry. The cache entry
    /// is dropped even when the content delete fails.
    #[instrument(skip_all, fields(hash = %id, user_id = tracing::field::Empty))]
    pub async fn delete(&self, token: &str, id: &str) -> Result<(), PasteError> {
        let identity = self.tokens.verify(token).map_err(|e| {
            debug!(error = %e, "Rejecting delete with invalid token");
            PasteError::Unauthorized
        })?;
        Span::current().record("user_id", identity.user_id);

        let record = self
            .bounded(StoreOp::LookupMetadata, self.metadata.find(id))
            .await?
            .ok_or(PasteError::NotFound)?;

        if record.author_id != identity.user_id {
            warn!(owner = record.author_id, "Delete refused, requester is not the owner");
            return Err(PasteError::Forbidden);
        }

        let removed = self
            .bounded(StoreOp::DeleteMetadata, self.metadata.delete(id))
            .await?;
        if !removed {
            // A concurrent delete got there first.
            return Err(PasteError::NotFound);
        }

        let content = self
            .bounded(StoreOp::DeleteContent, self.blobs.delete(id))
            .await;
        self.invalidate(id).await;

        if let Err(e) = content {
            error!(error = %e, "Content delete failed, blob left in place");
            return Err(e);
        }

        info!("Paste deleted");
        Ok(())
    }

    /// Metadata of every paste owned by `author_id`, newest first.
    #[instrument(skip(self))]
    pub async fn list_by_author(&self, author_id: i32) -> Result<Vec<PasteRecord>, PasteError> {
        self.bounded(StoreOp::ListMetadata, self.metadata.list_by_author(author_id))
            .await
    }

    async fn bounded<T, E, F>(&self, op: StoreOp, fut: F) -> Result<T, PasteError>
    where
        F: Future<Output = Result<T, E>>,
        E: std::error::Error + Send + Sync + 'static,
    {
        match timeout(self.ctx.store_timeout, fut).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(PasteError::store(op, e)),
            Err(elapsed) => Err(PasteError::store(op, elapsed)),
        }
    }

    async fn cached(&self, id: &str) -> Option<PasteView> {
        let cache = self.cache.as_ref()?;
        let raw = match timeout(self.ctx.cache_timeout, cache.get(id)).await {
            Ok(Ok(hit)) => hit?,
            Ok(Err(e)) => {
                warn!(error = %e, "Cache read failed");
                return None;
            }
            Err(_) => {
                warn!("Cache read timed out");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(view) => Some(view),
            Err(e) => {
                warn!(error = %e, "Discarding undecodable cache entry");
                None
            }
        }
    }

    /// Returns whether an entry was written.
    async fn populate(&self, id: &str, view: &PasteView) -> bool {
        let Some(cache) = &self.cache else {
            return false;
        };
        let payload = match serde_json::to_string(view) {
            Ok(payload) => payload,
            Err(e) => {
                warn!(error = %e, "Failed to encode cache entry");
                return false;
            }
        };
        match timeout(
            self.ctx.cache_timeout,
            cache.set(id, &payload, self.ctx.cache_ttl),
        )
        .await
        {
            Ok(Ok(())) => true,
            Ok(Err(e)) => {
                warn!(error = %e, "Cache write failed");
                false
            }
            Err(_) => {
                warn!("Cache write timed out");
                false
            }
        }
    }

    /// A delete that finished while this read was in flight has already
    /// invalidated the cache, so the entry just written would outlive the
    /// paste. Look the row up again and drop the entry unless it is still there.
    async fn drop_if_deleted(&self, id: &str) {
        match self
            .bounded(StoreOp::LookupMetadata, self.metadata.find(id))
            .await
        {
            Ok(Some(_)) => {}
            Ok(None) => {
                debug!("Paste deleted during read, dropping cache entry");
                self.invalidate(id).await;
            }
            Err(e) => {
                warn!(error = %e, "Could not confirm paste after caching it");
                self.invalidate(id).await;
            }
        }
    }

    async fn invalidate(&self, id: &str) {
        let Some(cache) = &self.cache else {
            return;
        };
        match timeout(self.ctx.cache_timeout, cache.delete(id)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!(error = %e, "Cache invalidation failed"),
            Err(_) => warn!("Cache invalidation timed out"),
        }
    }
}

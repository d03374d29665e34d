use std::time::Duration;

use async_trait::async_trait;

use super::error::CacheError;

/// A string-valued cache with per-entry expiry.
#[async_trait]
pub trait ResultCache: Send + Sync {
    /// Fetch a live entry. Expired and absent keys both yield `Ok(None)`.
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Insert or replace an entry that expires after `ttl`.
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError>;

    /// Remove an entry. Removing an absent key is not an error.
    async fn delete(&self, key: &str) -> Result<(), CacheError>;
}

use thiserror::Error;

/// Errors raised by a result cache backend.
///
/// Callers treat every variant like a miss on reads; they are surfaced only
/// so they can be logged.
#[derive(Debug, Error)]
pub enum CacheError {
    #[cfg(feature = "redis")]
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("cache backend error: {0}")]
    Backend(String),
}

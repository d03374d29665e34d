mod error;
mod traits;

pub mod memory;
#[cfg(feature = "redis")]
pub mod redis;

pub use error::CacheError;
pub use traits::ResultCache;

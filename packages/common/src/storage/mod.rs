mod error;
mod key;
mod traits;

pub mod filesystem;
#[cfg(feature = "object-storage")]
pub mod s3;

pub use error::StorageError;
pub use key::{MAX_KEY_LEN, ObjectKey};
pub use traits::BlobStore;

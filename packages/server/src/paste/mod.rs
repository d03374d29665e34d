//! The paste read/write core: id generation, metadata persistence and the
//! service that ties metadata, content and cache together.

pub mod error;
pub mod id;
pub mod service;
pub mod store;


pub use error::{PasteError, StoreOp};
pub use id::PasteId;
pub use service::{PasteDraft, PasteService, PasteServiceContext, PasteView};
pub use store::{MetadataStore, PasteRecord, SeaOrmMetadataStore};

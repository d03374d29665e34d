use std::fmt;

use thiserror::Error;

/// The boundary call a store failure happened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOp {
    InsertMetadata,
    LookupMetadata,
    DeleteMetadata,
    ListMetadata,
    UploadContent,
    DownloadContent,
    DeleteContent,
}

impl fmt::Display for StoreOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            StoreOp::InsertMetadata => "metadata insert",
            StoreOp::LookupMetadata => "metadata lookup",
            StoreOp::DeleteMetadata => "metadata delete",
            StoreOp::ListMetadata => "metadata listing",
            StoreOp::UploadContent => "content upload",
            StoreOp::DownloadContent => "content download",
            StoreOp::DeleteContent => "content delete",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Error)]
pub enum PasteError {
    #[error("paste not found")]
    NotFound,

    #[error("missing or invalid bearer token")]
    Unauthorized,

    #[error("requester does not own this paste")]
    Forbidden,

    #[error("{op} failed: {source}")]
    Store {
        op: StoreOp,
        #[source]
        source: anyhow::Error,
    },
}

impl PasteError {
    pub fn store<E>(op: StoreOp, err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        PasteError::Store {
            op,
            source: anyhow::Error::new(err),
        }
    }

    /// Operation label for store failures, `None` for the other kinds.
    pub fn op(&self) -> Option<StoreOp> {
        match self {
            PasteError::Store { op, .. } => Some(*op),
            _ => None,
        }
    }
}

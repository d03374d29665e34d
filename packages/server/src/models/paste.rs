use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entity::paste;
use crate::error::AppError;
use crate::paste::{PasteDraft, PasteView};

const MAX_TITLE_CHARS: usize = 256;
const MAX_LANGUAGE_CHARS: usize = 64;

/// Request body for saving a paste.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct SavePasteRequest {
    /// Optional display title.
    #[schema(example = "main.rs")]
    pub title: Option<String>,
    /// Optional syntax-highlighting hint.
    #[schema(example = "rust")]
    pub language: Option<String>,
    /// Paste body. Must not be empty.
    #[schema(example = "fn main() { println!(\"hi\"); }")]
    pub content: String,
}

pub fn validate_save_request(payload: &SavePasteRequest, max_bytes: u64) -> Result<(), AppError> {
    if payload.content.is_empty() {
        return Err(AppError::Validation("Content must not be empty".into()));
    }
    if payload.content.len() as u64 > max_bytes {
        return Err(AppError::Validation(format!(
            "Content must be at most {max_bytes} bytes"
        )));
    }
    if payload
        .title
        .as_ref()
        .is_some_and(|t| t.chars().count() > MAX_TITLE_CHARS)
    {
        return Err(AppError::Validation(format!(
            "Title must be at most {MAX_TITLE_CHARS} characters"
        )));
    }
    if payload
        .language
        .as_ref()
        .is_some_and(|l| l.chars().count() > MAX_LANGUAGE_CHARS)
    {
        return Err(AppError::Validation(format!(
            "Language must be at most {MAX_LANGUAGE_CHARS} characters"
        )));
    }
    Ok(())
}

impl From<SavePasteRequest> for PasteDraft {
    fn from(req: SavePasteRequest) -> Self {
        Self {
            title: req.title,
            language: req.language,
            content: req.content,
        }
    }
}

/// Successful save response.
#[derive(Serialize, Deserialize, utoipa::ToSchema)]
pub struct SavePasteResponse {
    /// Identifier of the new paste.
    #[schema(example = "aZ3kQ9xLm2Pq7RtY")]
    pub hash: String,
}

/// A paste as returned to readers.
#[derive(Serialize, Deserialize, utoipa::ToSchema)]
pub struct PasteResponse {
    #[schema(example = "main.rs")]
    pub title: Option<String>,
    #[schema(example = "rust")]
    pub language: Option<String>,
    #[schema(example = "fn main() { println!(\"hi\"); }")]
    pub content: String,
}

impl From<PasteView> for PasteResponse {
    fn from(view: PasteView) -> Self {
        Self {
            title: view.title,
            language: view.language,
            content: view.content,
        }
    }
}

/// Metadata of one paste in an owner's listing. Content is omitted.
#[derive(Serialize, Deserialize, utoipa::ToSchema)]
pub struct PasteSummary {
    #[schema(example = "aZ3kQ9xLm2Pq7RtY")]
    pub hash: String,
    #[schema(example = "main.rs")]
    pub title: Option<String>,
    #[schema(example = "rust")]
    pub language: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<paste::Model> for PasteSummary {
    fn from(row: paste::Model) -> Self {
        Self {
            hash: row.id,
            title: row.title,
            language: row.language,
            created_at: row.created_at,
        }
    }
}

/// The caller's pastes, newest first.
#[derive(Serialize, Deserialize, utoipa::ToSchema)]
pub struct PasteListResponse {
    pub pastes: Vec<PasteSummary>,
}

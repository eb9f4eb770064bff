use bytes::Bytes;
use thiserror::Error;

use crate::application::repos::{RepoError, StorageError};
use crate::domain::{entities::PostRecord, error::DomainError, uploads::ImageValidationError};

#[derive(Debug, Error)]
pub enum AdminPostError {
    #[error("{message}")]
    Validation { message: String },
    #[error(transparent)]
    InvalidImage(#[from] ImageValidationError),
    #[error("image upload failed: {0}")]
    Upload(#[source] StorageError),
    #[error("post {id} not found")]
    NotFound { id: i64 },
    #[error(transparent)]
    Repo(#[from] RepoError),
}

impl From<DomainError> for AdminPostError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation { message } => Self::Validation { message },
        }
    }
}

/// A file received from the admin form.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub filename: String,
    pub content_type: Option<String>,
    pub data: Bytes,
}

/// Create (no `id`) or update (with `id`) a post from the admin form.
#[derive(Debug, Clone)]
pub struct SavePostCommand {
    pub id: Option<i64>,
    pub title: String,
    pub content: String,
    /// Image URL currently shown in the form; kept when no file is uploaded.
    pub image_url: Option<String>,
    pub upload: Option<ImageUpload>,
}

#[derive(Debug, Clone)]
pub struct SaveOutcome {
    pub post: PostRecord,
    pub created: bool,
}

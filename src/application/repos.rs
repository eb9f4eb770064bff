//! Repository traits describing the hosted backend's table and storage APIs.

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::{auth::AccessToken, entities::PostRecord};

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("persistence error: {0}")]
    Persistence(String),
    #[error("resource not found")]
    NotFound,
    #[error("backend rejected the credentials for this request")]
    Unauthorized,
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
    #[error("backend timeout")]
    Timeout,
}

impl RepoError {
    pub fn from_persistence(err: impl std::fmt::Display) -> Self {
        Self::Persistence(err.to_string())
    }
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage rejected the object ({status}): {message}")]
    Rejected { status: u16, message: String },
    #[error("storage rejected the credentials for this request")]
    Unauthorized,
    #[error("storage unavailable: {0}")]
    Unavailable(String),
    #[error("storage timeout")]
    Timeout,
}

#[derive(Debug, Clone)]
pub struct CreatePostParams {
    pub title: String,
    pub content: String,
    pub image_url: Option<String>,
    pub author_name: Option<String>,
    pub user_id: Uuid,
    pub slug: Option<String>,
}

#[derive(Debug, Clone)]
pub struct UpdatePostParams {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub image_url: Option<String>,
    pub slug: Option<String>,
    /// When set, the update only matches rows owned by this user.
    pub owner: Option<Uuid>,
}

#[async_trait]
pub trait PostsRepo: Send + Sync {
    /// All posts, newest first.
    async fn list_posts(&self) -> Result<Vec<PostRecord>, RepoError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<PostRecord>, RepoError>;
}

#[async_trait]
pub trait PostsWriteRepo: Send + Sync {
    async fn create_post(
        &self,
        token: &AccessToken,
        params: CreatePostParams,
    ) -> Result<PostRecord, RepoError>;

    /// Returns [`RepoError::NotFound`] when no row matched.
    async fn update_post(
        &self,
        token: &AccessToken,
        params: UpdatePostParams,
    ) -> Result<PostRecord, RepoError>;

    /// Returns [`RepoError::NotFound`] when no row matched.
    async fn delete_post(&self, token: &AccessToken, id: i64) -> Result<(), RepoError>;
}

#[async_trait]
pub trait ObjectStorage: Send + Sync {
    async fn upload(
        &self,
        token: &AccessToken,
        object_name: &str,
        content_type: &str,
        data: Bytes,
    ) -> Result<(), StorageError>;

    fn public_url(&self, object_name: &str) -> String;

    async fn remove(&self, token: &AccessToken, object_name: &str) -> Result<(), StorageError>;
}

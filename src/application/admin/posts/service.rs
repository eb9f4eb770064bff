use std::sync::Arc;

use crate::application::repos::{ObjectStorage, PostsRepo, PostsWriteRepo};

#[derive(Clone)]
pub struct AdminPostService {
    pub(crate) reader: Arc<dyn PostsRepo>,
    pub(crate) writer: Arc<dyn PostsWriteRepo>,
    pub(crate) storage: Arc<dyn ObjectStorage>,
    pub(crate) scope_to_owner: bool,
    pub(crate) max_upload_bytes: u64,
    pub(crate) fallback_author: String,
}

impl AdminPostService {
    pub fn new(
        reader: Arc<dyn PostsRepo>,
        writer: Arc<dyn PostsWriteRepo>,
        storage: Arc<dyn ObjectStorage>,
    ) -> Self {
        Self {
            reader,
            writer,
            storage,
            scope_to_owner: false,
            max_upload_bytes: 10 * 1024 * 1024,
            fallback_author: "Admin".to_string(),
        }
    }

    /// Restrict updates to rows owned by the signed-in user.
    pub fn with_owner_scope(mut self, enabled: bool) -> Self {
        self.scope_to_owner = enabled;
        self
    }

    pub fn with_upload_limit(mut self, max_bytes: u64) -> Self {
        self.max_upload_bytes = max_bytes;
        self
    }

    pub fn with_fallback_author(mut self, author: impl Into<String>) -> Self {
        self.fallback_author = author.into();
        self
    }

    pub fn max_upload_bytes(&self) -> u64 {
        self.max_upload_bytes
    }
}

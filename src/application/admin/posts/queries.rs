use crate::domain::entities::PostRecord;

use super::service::AdminPostService;
use super::types::AdminPostError;

impl AdminPostService {
    /// Posts shown in the admin list, newest first.
    pub async fn list_posts(&self) -> Result<Vec<PostRecord>, AdminPostError> {
        let mut posts = self.reader.list_posts().await?;
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(posts)
    }

    pub async fn load_post(&self, id: i64) -> Result<PostRecord, AdminPostError> {
        self.reader
            .find_by_id(id)
            .await?
            .ok_or(AdminPostError::NotFound { id })
    }
}

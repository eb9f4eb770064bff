use time::OffsetDateTime;
use tracing::{info, warn};

use crate::application::repos::{CreatePostParams, RepoError, UpdatePostParams};
use crate::domain::auth::{AccessToken, AuthenticatedSession};
use crate::domain::posts::PostDraft;
use crate::domain::uploads::{content_type_for, inspect_image, object_name};

use super::service::AdminPostService;
use super::types::{AdminPostError, ImageUpload, SaveOutcome, SavePostCommand};

/// An object written to storage during the current request.
struct StoredImage {
    object_name: String,
    public_url: String,
}

impl AdminPostService {
    /// Validate the form, store the optional image, then insert or update the row.
    ///
    /// The upload always completes before the row write starts. When the write
    /// fails the freshly stored object is removed again.
    pub async fn save_post(
        &self,
        session: &AuthenticatedSession,
        command: SavePostCommand,
    ) -> Result<SaveOutcome, AdminPostError> {
        let mut draft = PostDraft::new(
            &command.title,
            &command.content,
            command.image_url.as_deref(),
        )?;

        let stored = match command.upload {
            Some(upload) => {
                let stored = self.store_image(&session.access_token, upload).await?;
                draft = draft.with_image_url(stored.public_url.clone());
                Some(stored)
            }
            None => None,
        };

        let result = match command.id {
            None => self.insert(session, draft).await,
            Some(id) => self.update(session, id, draft).await,
        };

        match result {
            Ok(outcome) => {
                let operation = if outcome.created { "create" } else { "update" };
                metrics::counter!("bagusblog_posts_written_total", "operation" => operation)
                    .increment(1);
                info!(
                    target = "bagusblog::application::admin::posts",
                    post_id = outcome.post.id,
                    operation,
                    "post saved"
                );
                Ok(outcome)
            }
            Err(err) => {
                if let Some(stored) = stored {
                    self.discard_image(&session.access_token, &stored.object_name)
                        .await;
                }
                Err(err)
            }
        }
    }

    /// Store an image for inline use in the editor and return its public URL.
    pub async fn upload_image(
        &self,
        session: &AuthenticatedSession,
        upload: ImageUpload,
    ) -> Result<String, AdminPostError> {
        let stored = self.store_image(&session.access_token, upload).await?;
        Ok(stored.public_url)
    }

    pub async fn delete_post(
        &self,
        session: &AuthenticatedSession,
        id: i64,
    ) -> Result<(), AdminPostError> {
        match self.writer.delete_post(&session.access_token, id).await {
            Ok(()) => {
                info!(
                    target = "bagusblog::application::admin::posts",
                    post_id = id,
                    "post deleted"
                );
                Ok(())
            }
            Err(RepoError::NotFound) => Err(AdminPostError::NotFound { id }),
            Err(err) => Err(err.into()),
        }
    }

    async fn insert(
        &self,
        session: &AuthenticatedSession,
        draft: PostDraft,
    ) -> Result<SaveOutcome, AdminPostError> {
        let author_name = session
            .user
            .author_name()
            .unwrap_or_else(|| self.fallback_author.clone());

        let params = CreatePostParams {
            title: draft.title,
            content: draft.content,
            image_url: draft.image_url,
            author_name: Some(author_name),
            user_id: session.user.id,
            slug: draft.slug,
        };

        let post = self
            .writer
            .create_post(&session.access_token, params)
            .await?;
        Ok(SaveOutcome {
            post,
            created: true,
        })
    }

    async fn update(
        &self,
        session: &AuthenticatedSession,
        id: i64,
        draft: PostDraft,
    ) -> Result<SaveOutcome, AdminPostError> {
        let params = UpdatePostParams {
            id,
            title: draft.title,
            content: draft.content,
            image_url: draft.image_url,
            slug: draft.slug,
            owner: self.scope_to_owner.then_some(session.user.id),
        };

        match self.writer.update_post(&session.access_token, params).await {
            Ok(post) => Ok(SaveOutcome {
                post,
                created: false,
            }),
            Err(RepoError::NotFound) => Err(AdminPostError::NotFound { id }),
            Err(err) => Err(err.into()),
        }
    }

    async fn store_image(
        &self,
        token: &AccessToken,
        upload: ImageUpload,
    ) -> Result<StoredImage, AdminPostError> {
        inspect_image(&upload.data, self.max_upload_bytes)?;

        let name = object_name(&upload.filename, OffsetDateTime::now_utc());
        let content_type = content_type_for(&name, upload.content_type.as_deref());
        let size = upload.data.len();

        self.storage
            .upload(token, &name, &content_type, upload.data)
            .await
            .map_err(AdminPostError::Upload)?;

        metrics::counter!("bagusblog_uploads_total").increment(1);
        info!(
            target = "bagusblog::application::admin::posts",
            object = %name,
            content_type = %content_type,
            size,
            "image stored"
        );

        Ok(StoredImage {
            public_url: self.storage.public_url(&name),
            object_name: name,
        })
    }

    async fn discard_image(&self, token: &AccessToken, object_name: &str) {
        match self.storage.remove(token, object_name).await {
            Ok(()) => info!(
                target = "bagusblog::application::admin::posts",
                object = %object_name,
                "removed image orphaned by failed post write"
            ),
            Err(err) => warn!(
                target = "bagusblog::application::admin::posts",
                object = %object_name,
                error = %err,
                "failed to remove orphaned image"
            ),
        }
    }
}

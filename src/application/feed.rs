use std::sync::Arc;

use thiserror::Error;

use crate::application::editor::EditorConfig;
use crate::application::repos::{PostsRepo, RepoError};
use crate::application::share::share_links;
use crate::application::site::{SiteProfile, display_date, iso_date};
use crate::domain::entities::PostRecord;
use crate::domain::posts::{self, DEFAULT_EXCERPT_CHARS};
use crate::presentation::views::{PostCardView, PostDetailView};

#[derive(Debug, Error)]
pub enum FeedError {
    #[error(transparent)]
    Repo(#[from] RepoError),
}

/// Read side of the public pages.
#[derive(Clone)]
pub struct FeedService {
    reader: Arc<dyn PostsRepo>,
    site: SiteProfile,
    editor: EditorConfig,
}

impl FeedService {
    pub fn new(reader: Arc<dyn PostsRepo>, site: SiteProfile, editor: EditorConfig) -> Self {
        Self {
            reader,
            site,
            editor,
        }
    }

    /// Every post, newest first.
    pub async fn list_posts(&self) -> Result<Vec<PostRecord>, FeedError> {
        let mut posts = self.reader.list_posts().await?;
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(posts)
    }

    pub async fn find_post(&self, id: i64) -> Result<Option<PostRecord>, FeedError> {
        Ok(self.reader.find_by_id(id).await?)
    }

    pub async fn post_cards(&self) -> Result<Vec<PostCardView>, FeedError> {
        let posts = self.list_posts().await?;
        Ok(posts.iter().map(card_view).collect())
    }

    pub async fn post_detail(&self, id: i64) -> Result<Option<PostDetailView>, FeedError> {
        let Some(post) = self.find_post(id).await? else {
            return Ok(None);
        };

        let content_html = if self.site.sanitize_content {
            self.editor.sanitize(&post.content)
        } else {
            post.content.clone()
        };
        let author_name = post
            .author_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(&self.site.fallback_author)
            .to_string();

        Ok(Some(PostDetailView {
            id: post.id,
            title: post.title.clone(),
            image_url: post.cover_image().map(str::to_string),
            avatar_initial: posts::title_initial(&post.title),
            author_name,
            date_display: display_date(post.created_at),
            date_iso: iso_date(post.created_at),
            share: share_links(&self.site, post.id, &post.title),
            content_html,
        }))
    }
}

fn card_view(post: &PostRecord) -> PostCardView {
    PostCardView {
        id: post.id,
        href: format!("/blog/{}", post.id),
        title: post.title.clone(),
        excerpt: posts::excerpt_from_html(&post.content, DEFAULT_EXCERPT_CHARS),
        image_url: post.cover_image().map(str::to_string),
        date_display: display_date(post.created_at),
        date_iso: iso_date(post.created_at),
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use time::macros::datetime;
    use url::Url;

    use super::*;

    struct FixedRepo(Vec<PostRecord>);

    #[async_trait]
    impl PostsRepo for FixedRepo {
        async fn list_posts(&self) -> Result<Vec<PostRecord>, RepoError> {
            Ok(self.0.clone())
        }

        async fn find_by_id(&self, id: i64) -> Result<Option<PostRecord>, RepoError> {
            Ok(self.0.iter().find(|post| post.id == id).cloned())
        }
    }

    fn post(id: i64, created_at: time::OffsetDateTime) -> PostRecord {
        PostRecord {
            id,
            title: format!("Post {id}"),
            content: r#"<p>Hello <b>there</b></p><script>alert(1)</script>"#.into(),
            image_url: None,
            author_name: None,
            user_id: None,
            slug: None,
            created_at,
        }
    }

    fn service(posts: Vec<PostRecord>, sanitize_content: bool) -> FeedService {
        let site = SiteProfile {
            brand_title: "BagusBlog".into(),
            tagline: String::new(),
            footer_copy: String::new(),
            public_site_url: Url::parse("https://blog.example/").unwrap(),
            fallback_author: "Admin".into(),
            sanitize_content,
        };
        FeedService::new(Arc::new(FixedRepo(posts)), site, EditorConfig::default())
    }

    #[tokio::test]
    async fn list_is_newest_first() {
        let service = service(
            vec![
                post(1, datetime!(2026-01-01 00:00 UTC)),
                post(3, datetime!(2026-03-01 00:00 UTC)),
                post(2, datetime!(2026-02-01 00:00 UTC)),
            ],
            false,
        );

        let ids: Vec<_> = service
            .post_cards()
            .await
            .unwrap()
            .into_iter()
            .map(|card| card.id)
            .collect();
        assert_eq!(ids, vec![3, 2, 1]);
    }

    #[tokio::test]
    async fn detail_falls_back_to_default_author() {
        let service = service(vec![post(1, datetime!(2026-01-01 00:00 UTC))], false);
        let detail = service.post_detail(1).await.unwrap().unwrap();

        assert_eq!(detail.author_name, "Admin");
        assert_eq!(detail.avatar_initial, "P");
        assert_eq!(detail.share.url, "https://blog.example/blog/1");
        assert!(detail.content_html.contains("<script>"));

        assert!(service.post_detail(99).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn avatar_shows_the_title_initial() {
        let mut record = post(1, datetime!(2026-01-01 00:00 UTC));
        record.title = "  rust notes".into();
        record.author_name = Some("Bagus".into());
        let service = service(vec![record], false);
        let detail = service.post_detail(1).await.unwrap().unwrap();

        assert_eq!(detail.author_name, "Bagus");
        assert_eq!(detail.avatar_initial, "R");
    }

    #[tokio::test]
    async fn detail_sanitizes_when_enabled() {
        let service = service(vec![post(1, datetime!(2026-01-01 00:00 UTC))], true);
        let detail = service.post_detail(1).await.unwrap().unwrap();
        assert_eq!(detail.content_html, "<p>Hello <b>there</b></p>");
    }
}

//! Domain entities mirrored from the hosted backend.

use serde::Serialize;
use time::OffsetDateTime;
use uuid::Uuid;

/// A single blog entry as stored in the `posts` table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostRecord {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub image_url: Option<String>,
    pub author_name: Option<String>,
    pub user_id: Option<Uuid>,
    pub slug: Option<String>,
    pub created_at: OffsetDateTime,
}

impl PostRecord {
    /// The cover image URL, treating an empty string as absent.
    pub fn cover_image(&self) -> Option<&str> {
        self.image_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_image_url_is_not_a_cover() {
        let mut post = PostRecord {
            id: 1,
            title: "Hello".into(),
            content: "<p>Hi</p>".into(),
            image_url: Some("  ".into()),
            author_name: None,
            user_id: None,
            slug: None,
            created_at: OffsetDateTime::UNIX_EPOCH,
        };
        assert_eq!(post.cover_image(), None);

        post.image_url = Some("https://cdn.example/1.png".into());
        assert_eq!(post.cover_image(), Some("https://cdn.example/1.png"));
    }
}

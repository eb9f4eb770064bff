//! Post drafting rules and text helpers shared by the public and admin views.

use std::collections::HashSet;

use ammonia::Builder;

use crate::domain::{error::DomainError, slug::derive_slug};

/// Default excerpt length used by list views, in characters.
pub const DEFAULT_EXCERPT_CHARS: usize = 220;

/// Validated form input ready to be written to the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostDraft {
    pub title: String,
    pub content: String,
    pub image_url: Option<String>,
    pub slug: Option<String>,
}

impl PostDraft {
    /// Validate raw form input. Title and content are both required.
    pub fn new(title: &str, content: &str, image_url: Option<&str>) -> Result<Self, DomainError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(DomainError::validation("title is required"));
        }

        let content = content.trim();
        if !html_has_content(content) {
            return Err(DomainError::validation("content is required"));
        }

        let image_url = image_url
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .map(str::to_string);

        Ok(Self {
            title: title.to_string(),
            content: content.to_string(),
            image_url,
            slug: derive_slug(title).ok(),
        })
    }

    /// Replace the cover image with a freshly uploaded one.
    pub fn with_image_url(self, url: String) -> Self {
        Self {
            image_url: Some(url),
            ..self
        }
    }
}

/// Whether an HTML fragment carries any visible text or an image.
pub fn html_has_content(html: &str) -> bool {
    if html.trim().is_empty() {
        return false;
    }
    !html_to_text(html).is_empty() || html.to_ascii_lowercase().contains("<img")
}

/// Produce a plain-text excerpt of at most `max_chars` characters.
pub fn excerpt_from_html(html: &str, max_chars: usize) -> String {
    let text = html_to_text(html);
    if text.chars().count() <= max_chars {
        return text;
    }

    let truncated: String = text.chars().take(max_chars).collect();
    let cut = match truncated.rfind(char::is_whitespace) {
        Some(index) if index > 0 => &truncated[..index],
        _ => truncated.as_str(),
    };
    format!("{}…", cut.trim_end())
}

/// Uppercased first character of a title, used for the author avatar.
pub fn title_initial(title: &str) -> String {
    title
        .trim()
        .chars()
        .next()
        .map(|ch| ch.to_uppercase().collect())
        .unwrap_or_else(|| "?".to_string())
}

fn html_to_text(html: &str) -> String {
    // Tags become word boundaries so `<p>a</p><p>b</p>` reads "a b".
    let spaced = html.replace('<', " <");
    let mut builder = Builder::empty();
    builder.clean_content_tags(HashSet::from(["script", "style"]));
    let cleaned = builder.clean(&spaced).to_string();

    let decoded = cleaned
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&amp;", "&");

    decoded.split_whitespace().collect::<Vec<_>>().join(" ")
}

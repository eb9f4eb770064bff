//! Site identity shared by every rendered page.

use time::{OffsetDateTime, format_description::well_known::Rfc3339, macros::format_description};
use url::Url;

use crate::config::SiteSettings;

#[derive(Debug, Clone)]
pub struct SiteProfile {
    pub brand_title: String,
    pub tagline: String,
    pub footer_copy: String,
    pub public_site_url: Url,
    pub fallback_author: String,
    pub sanitize_content: bool,
}

impl SiteProfile {
    /// Absolute public URL of a post's detail page.
    pub fn post_url(&self, id: i64) -> String {
        match self.public_site_url.join(&format!("blog/{id}")) {
            Ok(url) => url.to_string(),
            Err(_) => format!(
                "{}/blog/{id}",
                self.public_site_url.as_str().trim_end_matches('/')
            ),
        }
    }
}

impl From<&SiteSettings> for SiteProfile {
    fn from(settings: &SiteSettings) -> Self {
        Self {
            brand_title: settings.brand_title.clone(),
            tagline: settings.tagline.clone(),
            footer_copy: settings.footer_copy.clone(),
            public_site_url: settings.public_site_url.clone(),
            fallback_author: settings.fallback_author.clone(),
            sanitize_content: settings.sanitize_content,
        }
    }
}

/// Long-form date such as `15 October 2026`.
pub fn display_date(at: OffsetDateTime) -> String {
    at.format(format_description!(
        "[day padding:none] [month repr:long] [year]"
    ))
    .unwrap_or_else(|_| iso_date(at))
}

pub fn iso_date(at: OffsetDateTime) -> String {
    at.format(&Rfc3339).unwrap_or_default()
}

use url::Url;

use crate::application::site::SiteProfile;

const WHATSAPP_SEND_URL: &str = "https://api.whatsapp.com/send";

/// Links rendered by the share widget on a post page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareLinks {
    pub url: String,
    pub whatsapp_url: String,
}

pub fn share_links(site: &SiteProfile, id: i64, title: &str) -> ShareLinks {
    let url = site.post_url(id);
    let message = format!("Check out this post: {} - {url}", title.trim());
    ShareLinks {
        whatsapp_url: whatsapp_url(&message),
        url,
    }
}

fn whatsapp_url(message: &str) -> String {
    match Url::parse_with_params(WHATSAPP_SEND_URL, [("text", message)]) {
        Ok(url) => url.to_string(),
        Err(_) => WHATSAPP_SEND_URL.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn share_links_point_at_public_post_url() {
        let site = SiteProfile {
            brand_title: "BagusBlog".into(),
            tagline: String::new(),
            footer_copy: String::new(),
            public_site_url: Url::parse("https://blog.example/").unwrap(),
            fallback_author: "Admin".into(),
            sanitize_content: false,
        };

        let links = share_links(&site, 42, "Rust & Coffee");
        assert_eq!(links.url, "https://blog.example/blog/42");

        let parsed = Url::parse(&links.whatsapp_url).unwrap();
        assert_eq!(parsed.host_str(), Some("api.whatsapp.com"));
        let text = parsed
            .query_pairs()
            .find(|(key, _)| key == "text")
            .map(|(_, value)| value.into_owned())
            .unwrap();
        assert_eq!(
            text,
            "Check out this post: Rust & Coffee - https://blog.example/blog/42"
        );
    }
}

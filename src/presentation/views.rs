use crate::application::error::{ErrorReport, HttpError};
use crate::application::share::ShareLinks;
use crate::application::site::SiteProfile;
use askama::{Error as AskamaError, Template};
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use thiserror::Error;

#[derive(Debug, Error)]
#[error("{public_message}")]
pub struct TemplateRenderError {
    pub(crate) source: &'static str,
    pub(crate) public_message: &'static str,
    #[source]
    pub(crate) error: AskamaError,
}

impl TemplateRenderError {
    pub fn new(source: &'static str, public_message: &'static str, error: AskamaError) -> Self {
        Self {
            source,
            public_message,
            error,
        }
    }
}

impl From<TemplateRenderError> for HttpError {
    fn from(err: TemplateRenderError) -> Self {
        let TemplateRenderError {
            source,
            public_message,
            error,
        } = err;

        HttpError::from_error(
            source,
            StatusCode::INTERNAL_SERVER_ERROR,
            public_message,
            &error,
        )
    }
}

pub fn render_template<T: Template>(template: T) -> Result<Html<String>, HttpError> {
    template.render().map(Html).map_err(|err| {
        TemplateRenderError::new(
            "presentation::views::render_template",
            "Template rendering failed",
            err,
        )
        .into()
    })
}

pub fn render_template_response<T: Template>(template: T, status: StatusCode) -> Response {
    match render_template(template) {
        Ok(html) => (status, html).into_response(),
        Err(err) => err.into_response(),
    }
}

pub fn render_not_found_response(chrome: LayoutChrome) -> Response {
    let content = ErrorPageView::not_found();
    let chrome = chrome.with_title(&content.title);
    let view = LayoutContext::new(chrome, content);
    let mut response = render_template_response(ErrorTemplate { view }, StatusCode::NOT_FOUND);
    ErrorReport::from_message(
        "presentation::views::render_not_found_response",
        StatusCode::NOT_FOUND,
        "Resource not found",
    )
    .attach(&mut response);
    response
}

/// Full error page carrying a diagnostic report for the response logger.
pub fn render_error_response(
    chrome: LayoutChrome,
    content: ErrorPageView,
    report: ErrorReport,
) -> Response {
    let status = report.status;
    let chrome = chrome.with_title(&content.title);
    let view = LayoutContext::new(chrome, content);
    let mut response = render_template_response(ErrorTemplate { view }, status);
    report.attach(&mut response);
    response
}

#[derive(Clone)]
pub struct BrandView {
    pub title: String,
    pub tagline: String,
    pub href: String,
}

#[derive(Clone)]
pub struct FooterView {
    pub copy: String,
}

#[derive(Clone)]
pub struct PageMetaView {
    pub title: String,
    pub description: String,
    pub canonical: String,
}

#[derive(Clone)]
pub struct LayoutChrome {
    pub brand: BrandView,
    pub footer: FooterView,
    pub meta: PageMetaView,
}

impl LayoutChrome {
    pub fn for_site(site: &SiteProfile) -> Self {
        Self {
            brand: BrandView {
                title: site.brand_title.clone(),
                tagline: site.tagline.clone(),
                href: "/".to_string(),
            },
            footer: FooterView {
                copy: site.footer_copy.clone(),
            },
            meta: PageMetaView {
                title: site.brand_title.clone(),
                description: site.tagline.clone(),
                canonical: site.public_site_url.to_string(),
            },
        }
    }

    /// Prefix the document title with a page-specific title.
    pub fn with_title(self, title: &str) -> Self {
        let title = format!("{title} | {}", self.brand.title);
        Self {
            meta: PageMetaView { title, ..self.meta },
            ..self
        }
    }

    pub fn with_description(self, description: String) -> Self {
        Self {
            meta: PageMetaView {
                description,
                ..self.meta
            },
            ..self
        }
    }

    pub fn with_canonical(self, canonical: String) -> Self {
        Self {
            meta: PageMetaView {
                canonical,
                ..self.meta
            },
            ..self
        }
    }
}

#[derive(Clone)]
pub struct LayoutContext<T> {
    pub brand: BrandView,
    pub footer: FooterView,
    pub meta: PageMetaView,
    pub asset_version: &'static str,
    pub content: T,
}

impl<T> LayoutContext<T> {
    pub fn new(chrome: LayoutChrome, content: T) -> Self {
        Self {
            brand: chrome.brand,
            footer: chrome.footer,
            meta: chrome.meta,
            asset_version: env!("CARGO_PKG_VERSION"),
            content,
        }
    }
}

#[derive(Clone, Debug)]
pub struct PostCardView {
    pub id: i64,
    pub href: String,
    pub title: String,
    pub excerpt: String,
    pub image_url: Option<String>,
    pub date_display: String,
    pub date_iso: String,
}

pub struct IndexView {
    pub posts: Vec<PostCardView>,
}

impl IndexView {
    pub fn has_posts(&self) -> bool {
        !self.posts.is_empty()
    }
}

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub view: LayoutContext<IndexView>,
}

#[derive(Clone, Debug)]
pub struct PostDetailView {
    pub id: i64,
    pub title: String,
    pub content_html: String,
    pub image_url: Option<String>,
    pub author_name: String,
    pub avatar_initial: String,
    pub date_display: String,
    pub date_iso: String,
    pub share: ShareLinks,
}

#[derive(Template)]
#[template(path = "post.html")]
pub struct PostTemplate {
    pub view: LayoutContext<PostDetailView>,
}

pub struct ErrorPageView {
    pub title: String,
    pub message: String,
    pub primary_action: Option<ErrorAction>,
}

impl ErrorPageView {
    pub fn not_found() -> Self {
        Self {
            title: "Post Not Found".to_string(),
            message: "The post you are looking for does not exist or has been removed."
                .to_string(),
            primary_action: Some(ErrorAction::home()),
        }
    }

    pub fn unavailable() -> Self {
        Self {
            title: "Something Went Wrong".to_string(),
            message: "Posts could not be loaded right now. Please try again in a moment."
                .to_string(),
            primary_action: Some(ErrorAction::home()),
        }
    }
}

pub struct ErrorAction {
    pub href: String,
    pub label: String,
}

impl ErrorAction {
    pub fn home() -> Self {
        Self {
            href: "/".to_string(),
            label: "Back to home".to_string(),
        }
    }
}

#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorTemplate {
    pub view: LayoutContext<ErrorPageView>,
}

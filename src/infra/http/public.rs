use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::{
    application::{error::ErrorReport, feed::FeedError},
    domain::posts::{DEFAULT_EXCERPT_CHARS, excerpt_from_html},
    presentation::views::{
        ErrorPageView, IndexTemplate, IndexView, LayoutChrome, LayoutContext, PostTemplate,
        render_error_response, render_not_found_response, render_template_response,
    },
};

use super::HttpState;

pub(super) async fn index(State(state): State<HttpState>) -> Response {
    let chrome = LayoutChrome::for_site(&state.site);

    match state.feed.post_cards().await {
        Ok(posts) => {
            let view = LayoutContext::new(chrome, IndexView { posts });
            render_template_response(IndexTemplate { view }, StatusCode::OK)
        }
        Err(err) => feed_error_to_response("infra::http::public::index", err, chrome),
    }
}

pub(super) async fn post_detail(
    State(state): State<HttpState>,
    Path(raw_id): Path<String>,
) -> Response {
    let chrome = LayoutChrome::for_site(&state.site);

    let Ok(id) = raw_id.trim().parse::<i64>() else {
        return render_not_found_response(chrome);
    };

    match state.feed.post_detail(id).await {
        Ok(Some(content)) => {
            let chrome = chrome
                .with_title(&content.title)
                .with_description(excerpt_from_html(&content.content_html, DEFAULT_EXCERPT_CHARS))
                .with_canonical(content.share.url.clone());
            let view = LayoutContext::new(chrome, content);
            render_template_response(PostTemplate { view }, StatusCode::OK)
        }
        Ok(None) => render_not_found_response(chrome),
        Err(err) => feed_error_to_response("infra::http::public::post_detail", err, chrome),
    }
}

pub(super) async fn health() -> Response {
    StatusCode::NO_CONTENT.into_response()
}

pub(super) async fn fallback(State(state): State<HttpState>) -> Response {
    render_not_found_response(LayoutChrome::for_site(&state.site))
}

fn feed_error_to_response(source: &'static str, err: FeedError, chrome: LayoutChrome) -> Response {
    let report = ErrorReport::from_error(source, StatusCode::SERVICE_UNAVAILABLE, &err);
    render_error_response(chrome, ErrorPageView::unavailable(), report)
}

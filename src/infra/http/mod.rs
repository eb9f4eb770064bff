mod admin;
mod login;
mod middleware;
mod public;
pub mod session;

use std::sync::Arc;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{get, post},
};

use crate::application::{
    admin::{AdminPostService, SubmissionGuard},
    auth::AuthService,
    editor::EditorConfig,
    feed::FeedService,
    site::SiteProfile,
};

pub use middleware::RequestContext;
pub use session::SessionCookies;

use middleware::{log_responses, route_guard, set_request_context};

#[derive(Clone)]
pub struct HttpState {
    pub feed: Arc<FeedService>,
    pub admin: Arc<AdminPostService>,
    pub auth: Arc<AuthService>,
    pub submissions: SubmissionGuard,
    pub editor: Arc<EditorConfig>,
    pub site: Arc<SiteProfile>,
    pub cookies: SessionCookies,
    /// Largest multipart body accepted on admin routes.
    pub upload_body_limit: usize,
}

pub fn build_router(state: HttpState) -> Router {
    let public_routes = Router::new()
        .route("/", get(public::index))
        .route("/blog/{id}", get(public::post_detail))
        .route("/login", get(login::login_page).post(login::login_submit))
        .route("/_health", get(public::health))
        .route("/static/{*path}", get(crate::infra::assets::serve_static));

    let admin_routes = Router::new()
        .route("/admin", get(admin::admin_page))
        .route("/admin/posts", post(admin::create_post))
        .route("/admin/posts/{id}", post(admin::update_post))
        .route(
            "/admin/posts/{id}/delete",
            get(admin::delete_confirm).post(admin::delete_post),
        )
        .route("/admin/uploads", post(admin::upload_image))
        .route("/admin/logout", post(login::logout))
        .layer(DefaultBodyLimit::max(state.upload_body_limit));

    public_routes
        .merge(admin_routes)
        .fallback(public::fallback)
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            route_guard,
        ))
        .with_state(state)
        .layer(axum_middleware::from_fn(log_responses))
        .layer(axum_middleware::from_fn(set_request_context))
}

//! Guarded admin surface: editor page, post writes and image uploads.

mod errors;
mod forms;

use axum::{
    Extension, Form, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::Multipart;
use serde::Deserialize;
use serde_json::json;

use crate::{
    application::{
        admin::{SubmissionRefused, SubmissionTicket, posts::AdminPostError},
        error::{ErrorReport, HttpError},
        site::display_date,
    },
    domain::{auth::AuthenticatedSession, entities::PostRecord},
    presentation::{
        admin::views::{
            AdminDeleteTemplate, AdminDeleteView, AdminFormView, AdminPageView,
            AdminPostRowView, AdminTemplate, BannerView, format_upload_limit,
        },
        views::{LayoutChrome, LayoutContext, render_template_response},
    },
};

use self::errors::{admin_error_message, admin_error_status, delete_error_message};
use self::forms::{FormPayloadError, TokenForm, read_image_upload, read_post_form};
use super::HttpState;

const SOURCE: &str = "infra::http::admin";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct AdminQuery {
    edit: Option<String>,
    notice: Option<String>,
}

#[derive(Debug, Clone, Copy)]
enum Notice {
    Created,
    Updated,
    Deleted,
}

impl Notice {
    fn as_str(self) -> &'static str {
        match self {
            Notice::Created => "created",
            Notice::Updated => "updated",
            Notice::Deleted => "deleted",
        }
    }

    fn parse(value: &str) -> Option<Self> {
        match value {
            "created" => Some(Notice::Created),
            "updated" => Some(Notice::Updated),
            "deleted" => Some(Notice::Deleted),
            _ => None,
        }
    }

    fn message(self) -> &'static str {
        match self {
            Notice::Created => "Post created successfully!",
            Notice::Updated => "Post updated successfully!",
            Notice::Deleted => "Post deleted successfully!",
        }
    }

    fn redirect(self) -> Response {
        Redirect::to(&format!("/admin?notice={}", self.as_str())).into_response()
    }
}

pub(super) async fn admin_page(
    State(state): State<HttpState>,
    Extension(session): Extension<AuthenticatedSession>,
    Query(query): Query<AdminQuery>,
) -> Response {
    let mut banner = query
        .notice
        .as_deref()
        .and_then(Notice::parse)
        .map(|notice| BannerView::success(notice.message()));
    let mut form = blank_form(&state);
    let mut status = StatusCode::OK;

    if let Some(raw) = query.edit.as_deref().filter(|value| !value.trim().is_empty()) {
        let loaded = match raw.trim().parse::<i64>() {
            Ok(id) => state.admin.load_post(id).await,
            Err(_) => Err(AdminPostError::Validation {
                message: format!("invalid post id `{raw}`"),
            }),
        };

        match loaded {
            Ok(post) => {
                form = AdminFormView {
                    editing_id: Some(post.id),
                    title: post.title,
                    content: post.content,
                    image_url: post.image_url.unwrap_or_default(),
                    form_token: form.form_token,
                };
            }
            Err(err) => {
                status = admin_error_status(&err);
                banner = Some(BannerView::error(admin_error_message(&err)));
            }
        }
    }

    render_admin(&state, &session, form, banner, status).await
}

pub(super) async fn create_post(
    State(state): State<HttpState>,
    Extension(session): Extension<AuthenticatedSession>,
    multipart: Multipart,
) -> Response {
    save_post(state, session, None, multipart).await
}

pub(super) async fn update_post(
    State(state): State<HttpState>,
    Extension(session): Extension<AuthenticatedSession>,
    Path(id): Path<i64>,
    multipart: Multipart,
) -> Response {
    save_post(state, session, Some(id), multipart).await
}

async fn save_post(
    state: HttpState,
    session: AuthenticatedSession,
    id: Option<i64>,
    multipart: Multipart,
) -> Response {
    let form = match read_post_form(multipart).await {
        Ok(form) => form,
        Err(err) => return payload_error_response(&state, &session, id, err).await,
    };

    let _ticket = match claim_submission(&state, &form.form_token) {
        Ok(ticket) => ticket,
        Err(err) => return err.into_response(),
    };

    let view = form.to_view(id);
    match state.admin.save_post(&session, form.into_command(id)).await {
        Ok(outcome) if outcome.created => Notice::Created.redirect(),
        Ok(_) => Notice::Updated.redirect(),
        Err(err) => admin_error_response(&state, &session, view, err).await,
    }
}

pub(super) async fn delete_confirm(
    State(state): State<HttpState>,
    Extension(session): Extension<AuthenticatedSession>,
    Path(id): Path<i64>,
) -> Response {
    match state.admin.load_post(id).await {
        Ok(post) => render_delete_confirm(&state, post.id, post.title, None, StatusCode::OK),
        Err(err) => {
            let form = blank_form(&state);
            admin_error_response(&state, &session, form, err).await
        }
    }
}

pub(super) async fn delete_post(
    State(state): State<HttpState>,
    Extension(session): Extension<AuthenticatedSession>,
    Path(id): Path<i64>,
    Form(form): Form<TokenForm>,
) -> Response {
    let _ticket = match claim_submission(&state, &form.form_token) {
        Ok(ticket) => ticket,
        Err(err) => return err.into_response(),
    };

    match state.admin.delete_post(&session, id).await {
        Ok(()) => Notice::Deleted.redirect(),
        Err(err @ AdminPostError::NotFound { .. }) => {
            let form = blank_form(&state);
            admin_error_response(&state, &session, form, err).await
        }
        Err(err) => {
            let status = admin_error_status(&err);
            let title = match state.admin.load_post(id).await {
                Ok(post) => post.title,
                Err(_) => format!("post #{id}"),
            };
            let banner = BannerView::error(delete_error_message(&err));
            let mut response = render_delete_confirm(&state, id, title, Some(banner), status);
            ErrorReport::from_error(SOURCE, status, &err).attach(&mut response);
            response
        }
    }
}

fn render_delete_confirm(
    state: &HttpState,
    id: i64,
    title: String,
    banner: Option<BannerView>,
    status: StatusCode,
) -> Response {
    let content = AdminDeleteView {
        id,
        title,
        form_token: state.submissions.issue_token(),
        banner,
    };
    let chrome = LayoutChrome::for_site(&state.site).with_title("Delete Post");
    let view = LayoutContext::new(chrome, content);
    render_template_response(AdminDeleteTemplate { view }, status)
}

/// In-editor image upload. Answers with `{"url": ...}` or `{"error": ...}`.
pub(super) async fn upload_image(
    State(state): State<HttpState>,
    Extension(session): Extension<AuthenticatedSession>,
    multipart: Multipart,
) -> Response {
    let upload = match read_image_upload(multipart).await {
        Ok(upload) => upload,
        Err(err) => {
            let status = err.status();
            let mut response =
                (status, Json(json!({ "error": err.to_string() }))).into_response();
            ErrorReport::from_error(SOURCE, status, &err).attach(&mut response);
            return response;
        }
    };

    match state.admin.upload_image(&session, upload).await {
        Ok(url) => Json(json!({ "url": url })).into_response(),
        Err(err) => {
            let status = admin_error_status(&err);
            let mut response =
                (status, Json(json!({ "error": admin_error_message(&err) }))).into_response();
            ErrorReport::from_error(SOURCE, status, &err).attach(&mut response);
            response
        }
    }
}

fn claim_submission(state: &HttpState, token: &str) -> Result<SubmissionTicket, HttpError> {
    state
        .submissions
        .try_begin(token)
        .map_err(|refused| match refused {
            SubmissionRefused::MissingToken => HttpError::from_error(
                SOURCE,
                StatusCode::BAD_REQUEST,
                "This form is missing its submission token; reload the page and try again",
                &refused,
            ),
            SubmissionRefused::InFlight => HttpError::from_error(
                SOURCE,
                StatusCode::CONFLICT,
                "This form is already being submitted",
                &refused,
            ),
        })
}

fn blank_form(state: &HttpState) -> AdminFormView {
    AdminFormView {
        form_token: state.submissions.issue_token(),
        ..AdminFormView::default()
    }
}

async fn admin_error_response(
    state: &HttpState,
    session: &AuthenticatedSession,
    form: AdminFormView,
    err: AdminPostError,
) -> Response {
    let status = admin_error_status(&err);
    let banner = BannerView::error(admin_error_message(&err));
    let mut response = render_admin(state, session, form, Some(banner), status).await;
    ErrorReport::from_error(SOURCE, status, &err).attach(&mut response);
    response
}

async fn payload_error_response(
    state: &HttpState,
    session: &AuthenticatedSession,
    id: Option<i64>,
    err: FormPayloadError,
) -> Response {
    let status = err.status();
    let form = AdminFormView {
        editing_id: id,
        ..blank_form(state)
    };
    let banner = BannerView::error(format!("Error saving post: {err}"));
    let mut response = render_admin(state, session, form, Some(banner), status).await;
    ErrorReport::from_error(SOURCE, status, &err).attach(&mut response);
    response
}

async fn render_admin(
    state: &HttpState,
    session: &AuthenticatedSession,
    form: AdminFormView,
    banner: Option<BannerView>,
    status: StatusCode,
) -> Response {
    let (posts, banner, status) = match state.admin.list_posts().await {
        Ok(posts) => (posts.iter().map(row_view).collect(), banner, status),
        Err(err) => {
            let status = if status.is_success() {
                StatusCode::SERVICE_UNAVAILABLE
            } else {
                status
            };
            let banner = banner
                .unwrap_or_else(|| BannerView::error(format!("Error loading posts: {err}")));
            (Vec::new(), Some(banner), status)
        }
    };

    let operator = session
        .user
        .author_name()
        .unwrap_or_else(|| state.site.fallback_author.clone());

    let content = AdminPageView {
        form,
        posts,
        banner,
        toolbar: state.editor.toolbar(),
        operator,
        upload_limit_label: format_upload_limit(state.admin.max_upload_bytes()),
    };
    let chrome = LayoutChrome::for_site(&state.site).with_title("Dashboard");
    let view = LayoutContext::new(chrome, content);
    render_template_response(AdminTemplate { view }, status)
}

fn row_view(post: &PostRecord) -> AdminPostRowView {
    AdminPostRowView {
        id: post.id,
        title: post.title.clone(),
        image_url: post.cover_image().map(str::to_string),
        date_display: display_date(post.created_at),
        view_href: format!("/blog/{}", post.id),
        edit_href: format!("/admin?edit={}", post.id),
        delete_href: format!("/admin/posts/{}/delete", post.id),
    }
}

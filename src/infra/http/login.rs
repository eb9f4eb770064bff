//! Operator sign-in and sign-out.

use axum::{
    Extension, Form,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use tracing::warn;

use crate::{
    application::{
        auth::AuthError,
        error::ErrorReport,
        guard::{ADMIN_PATH, LOGIN_PATH},
    },
    domain::auth::AuthenticatedSession,
    presentation::{
        admin::views::{LoginTemplate, LoginView},
        views::{LayoutChrome, LayoutContext, render_template_response},
    },
};

use super::HttpState;

const SOURCE: &str = "infra::http::login";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct LoginForm {
    email: String,
    password: String,
}

pub(super) async fn login_page(State(state): State<HttpState>) -> Response {
    render_login(&state, LoginView::default(), StatusCode::OK)
}

pub(super) async fn login_submit(
    State(state): State<HttpState>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Response {
    match state.auth.sign_in(&form.email, &form.password).await {
        Ok(session) => {
            let jar = state.cookies.store(jar, &session);
            (jar, Redirect::to(ADMIN_PATH)).into_response()
        }
        Err(err) => {
            let (status, message) = match &err {
                AuthError::InvalidCredentials { message } => {
                    (StatusCode::UNAUTHORIZED, message.clone())
                }
                _ => (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "Sign-in is unavailable right now. Please try again.".to_string(),
                ),
            };
            let view = LoginView {
                email: form.email.trim().to_string(),
                error: Some(message),
            };
            let mut response = render_login(&state, view, status);
            ErrorReport::from_error(SOURCE, status, &err).attach(&mut response);
            response
        }
    }
}

pub(super) async fn logout(
    State(state): State<HttpState>,
    Extension(session): Extension<AuthenticatedSession>,
    jar: CookieJar,
) -> Response {
    if let Err(err) = state.auth.sign_out(&session.access_token).await {
        warn!(
            target = "bagusblog::http::login",
            error = %err,
            "backend sign-out failed; clearing local session anyway"
        );
    }

    let jar = state.cookies.clear(jar);
    (jar, Redirect::to(LOGIN_PATH)).into_response()
}

fn render_login(state: &HttpState, view: LoginView, status: StatusCode) -> Response {
    let chrome = LayoutChrome::for_site(&state.site).with_title("Admin Login");
    let view = LayoutContext::new(chrome, view);
    render_template_response(LoginTemplate { view }, status)
}

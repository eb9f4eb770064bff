use std::time::Instant;

use axum::{
    body::Body,
    extract::State,
    http::{Request, header::SET_COOKIE},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use tracing::{debug, error, warn};
use uuid::Uuid;

use crate::application::{
    error::ErrorReport,
    guard::{GuardDecision, RouteClass, decide},
};

use super::HttpState;

#[derive(Clone)]
pub struct RequestContext {
    pub request_id: String,
}

pub async fn set_request_context(mut request: Request<Body>, next: Next) -> Response {
    let request_id = Uuid::new_v4().to_string();
    let ctx = RequestContext {
        request_id: request_id.clone(),
    };
    request.extensions_mut().insert(ctx.clone());

    let mut response = next.run(request).await;
    response.extensions_mut().insert(ctx);
    response
}

/// Resolve the operator session for `/admin` and `/login` paths and redirect
/// when the path does not fit the session state.
///
/// Handlers behind the guard read the session from the request extensions.
pub async fn route_guard(
    State(state): State<HttpState>,
    jar: CookieJar,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let class = RouteClass::classify(request.uri().path());
    if !class.needs_session() {
        return next.run(request).await;
    }

    let resolution = state.auth.resolve(state.cookies.tokens(&jar)).await;
    let cookie_jar = state.cookies.apply_update(jar, &resolution.cookies);

    let response = match decide(class, resolution.is_authenticated()) {
        GuardDecision::Redirect(target) => {
            debug!(
                target = "bagusblog::http::guard",
                path = %request.uri().path(),
                redirect = target,
                "route guard redirect"
            );
            Redirect::to(target).into_response()
        }
        GuardDecision::Pass => {
            if let Some(session) = resolution.session {
                request.extensions_mut().insert(session);
            }
            next.run(request).await
        }
    };

    // Handlers that manage the cookies themselves win.
    match cookie_jar {
        Some(jar) if !response.headers().contains_key(SET_COOKIE) => {
            (jar, response).into_response()
        }
        _ => response,
    }
}

pub async fn log_responses(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let start = Instant::now();

    let request_id = request
        .extensions()
        .get::<RequestContext>()
        .map(|ctx| ctx.request_id.clone())
        .unwrap_or_default();

    let mut response = next.run(request).await;
    let status = response.status();

    if status.is_client_error() || status.is_server_error() {
        let elapsed_ms = start.elapsed().as_millis();
        let report = response.extensions_mut().remove::<ErrorReport>();
        let (source, messages) = match report {
            Some(report) => (report.source, report.messages),
            None => ("unknown", Vec::new()),
        };
        let detail = messages
            .first()
            .cloned()
            .unwrap_or_else(|| "no diagnostic available".to_string());

        if status.is_server_error() {
            error!(
                target = "bagusblog::http::response",
                status = status.as_u16(),
                method = %method,
                path = %uri.path(),
                elapsed_ms = elapsed_ms,
                source = source,
                detail = %detail,
                chain = ?messages,
                request_id = request_id,
                "request failed",
            );
        } else {
            warn!(
                target = "bagusblog::http::response",
                status = status.as_u16(),
                method = %method,
                path = %uri.path(),
                elapsed_ms = elapsed_ms,
                source = source,
                detail = %detail,
                request_id = request_id,
                "client request error",
            );
        }
    }

    response
}

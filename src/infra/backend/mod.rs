//! HTTP client for the hosted database, storage and auth service.
//!
//! One [`BackendClient`] is built from configuration at startup and shared
//! through application state. Every call sends the project's public key as
//! `apikey`; calls made on behalf of a signed-in user additionally carry that
//! user's access token as the bearer credential, otherwise the public key is
//! used as bearer.

mod auth;
mod rest;
mod storage;

use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;
use url::Url;

use crate::config::BackendSettings;
use crate::domain::auth::AccessToken;
use crate::infra::error::InfraError;

const MAX_ERROR_MESSAGE_CHARS: usize = 300;

#[derive(Clone)]
pub struct BackendClient {
    http: Client,
    base_url: Url,
    anon_key: String,
    posts_table: String,
    images_bucket: String,
}

/// Failure of a single backend round trip, before it is mapped onto the
/// error type of the calling port.
#[derive(Debug, Error)]
pub(crate) enum CallError {
    #[error("request timed out")]
    Timeout,
    #[error("transport error: {0}")]
    Transport(String),
    #[error("backend responded with {status}: {message}")]
    Status { status: StatusCode, message: String },
    #[error("unexpected response body: {0}")]
    Decode(String),
    #[error("invalid backend URL: {0}")]
    Url(#[from] url::ParseError),
}

impl From<reqwest::Error> for CallError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            CallError::Timeout
        } else if err.is_decode() {
            CallError::Decode(err.to_string())
        } else {
            CallError::Transport(err.to_string())
        }
    }
}

impl BackendClient {
    pub fn new(
        base_url: Url,
        anon_key: impl Into<String>,
        posts_table: impl Into<String>,
        images_bucket: impl Into<String>,
        timeout: std::time::Duration,
    ) -> Result<Self, InfraError> {
        let http = Client::builder()
            .user_agent(concat!("bagusblog/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|err| InfraError::backend(format!("failed to build HTTP client: {err}")))?;

        Ok(Self {
            http,
            base_url: ensure_trailing_slash(base_url),
            anon_key: anon_key.into(),
            posts_table: posts_table.into(),
            images_bucket: images_bucket.into(),
        })
    }

    pub fn from_settings(settings: &BackendSettings) -> Result<Self, InfraError> {
        let url = settings.url.clone().ok_or_else(|| {
            InfraError::configuration(
                "backend URL is not set (use SUPABASE_URL or BAGUSBLOG__BACKEND__URL)",
            )
        })?;
        let anon_key = settings.anon_key.clone().ok_or_else(|| {
            InfraError::configuration(
                "backend anon key is not set (use SUPABASE_ANON_KEY or BAGUSBLOG__BACKEND__ANON_KEY)",
            )
        })?;

        Self::new(
            url,
            anon_key,
            settings.posts_table.clone(),
            settings.images_bucket.clone(),
            settings.request_timeout,
        )
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Probe the auth service and the posts table with the public key.
    pub async fn check_health(&self) -> Result<(), InfraError> {
        let url = self.endpoint("auth/v1/health").map_err(backend_error)?;
        self.send("auth", self.request(Method::GET, url, None))
            .await
            .map_err(backend_error)?;

        let mut url = self
            .endpoint(&format!("rest/v1/{}", self.posts_table))
            .map_err(backend_error)?;
        url.query_pairs_mut()
            .append_pair("select", "id")
            .append_pair("limit", "1");
        self.send("rest", self.request(Method::GET, url, None))
            .await
            .map_err(backend_error)?;
        Ok(())
    }

    fn endpoint(&self, path: &str) -> Result<Url, CallError> {
        Ok(self.base_url.join(path)?)
    }

    fn request(&self, method: Method, url: Url, token: Option<&AccessToken>) -> RequestBuilder {
        let bearer = token.map_or(self.anon_key.as_str(), AccessToken::as_str);
        self.http
            .request(method, url)
            .header("apikey", &self.anon_key)
            .bearer_auth(bearer)
    }

    /// Send a request and turn non-success statuses into [`CallError::Status`].
    async fn send(
        &self,
        service: &'static str,
        request: RequestBuilder,
    ) -> Result<Response, CallError> {
        let response = match request.send().await {
            Ok(response) => response,
            Err(err) => {
                metrics::counter!("bagusblog_backend_errors_total", "service" => service)
                    .increment(1);
                return Err(err.into());
            }
        };

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        metrics::counter!("bagusblog_backend_errors_total", "service" => service).increment(1);
        let body = response.text().await.unwrap_or_default();
        let message = error_message(status, &body);
        debug!(
            target = "bagusblog::infra::backend",
            service,
            status = status.as_u16(),
            message = %message,
            "backend call failed"
        );
        Err(CallError::Status { status, message })
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        service: &'static str,
        request: RequestBuilder,
    ) -> Result<T, CallError> {
        let response = self.send(service, request).await?;
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|err| CallError::Decode(err.to_string()))
    }
}

fn ensure_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

fn backend_error(err: CallError) -> InfraError {
    InfraError::backend(err.to_string())
}

/// Human-readable message from an error body, whichever service produced it.
fn error_message(status: StatusCode, body: &str) -> String {
    let from_json = serde_json::from_str::<Value>(body).ok().and_then(|value| {
        ["message", "msg", "error_description", "error"]
            .iter()
            .find_map(|key| value.get(*key).and_then(Value::as_str).map(str::to_string))
    });

    let message = from_json.unwrap_or_else(|| body.trim().to_string());
    if message.is_empty() {
        return status
            .canonical_reason()
            .unwrap_or("unexpected status")
            .to_string();
    }
    message.chars().take(MAX_ERROR_MESSAGE_CHARS).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_message_prefers_known_json_keys() {
        assert_eq!(
            error_message(
                StatusCode::BAD_REQUEST,
                r#"{"error":"invalid_grant","error_description":"Invalid login credentials"}"#
            ),
            "Invalid login credentials"
        );
        assert_eq!(
            error_message(StatusCode::BAD_REQUEST, r#"{"code":"23502","message":"null value"}"#),
            "null value"
        );
        assert_eq!(
            error_message(StatusCode::BAD_GATEWAY, "upstream down"),
            "upstream down"
        );
        assert_eq!(error_message(StatusCode::NOT_FOUND, ""), "Not Found");
    }

    #[test]
    fn base_url_is_normalised() {
        let url = ensure_trailing_slash(Url::parse("https://project.supabase.co/prefix").unwrap());
        assert_eq!(url.as_str(), "https://project.supabase.co/prefix/");
        assert_eq!(
            url.join("rest/v1/posts").unwrap().as_str(),
            "https://project.supabase.co/prefix/rest/v1/posts"
        );
    }
}

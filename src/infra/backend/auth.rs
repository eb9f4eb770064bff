use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use serde::Deserialize;
use serde_json::{Value, json};
use uuid::Uuid;

use crate::application::auth::{AuthError, AuthGateway};
use crate::domain::auth::{AccessToken, AuthSession, SessionUser};

use super::{BackendClient, CallError};

const SERVICE: &str = "auth";

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: String,
    #[serde(default)]
    expires_in: i64,
    user: UserResponse,
}

#[derive(Debug, Deserialize)]
struct UserResponse {
    id: Uuid,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    user_metadata: Option<Value>,
}

impl From<UserResponse> for SessionUser {
    fn from(user: UserResponse) -> Self {
        let display_name = user.user_metadata.as_ref().and_then(|metadata| {
            ["full_name", "name", "display_name"].iter().find_map(|key| {
                metadata
                    .get(*key)
                    .and_then(Value::as_str)
                    .map(str::trim)
                    .filter(|name| !name.is_empty())
                    .map(str::to_string)
            })
        });

        Self {
            id: user.id,
            email: user.email,
            display_name,
        }
    }
}

impl From<TokenResponse> for AuthSession {
    fn from(response: TokenResponse) -> Self {
        Self {
            access_token: AccessToken::new(response.access_token),
            refresh_token: response.refresh_token,
            expires_in: response.expires_in,
            user: response.user.into(),
        }
    }
}

fn transport_error(err: CallError) -> AuthError {
    match err {
        CallError::Timeout => AuthError::Timeout,
        CallError::Status { status, message } if status.is_server_error() => {
            AuthError::Unavailable(format!("{status}: {message}"))
        }
        CallError::Status { status, message } => AuthError::Rejected {
            status: status.as_u16(),
            message,
        },
        other => AuthError::Unavailable(other.to_string()),
    }
}

impl BackendClient {
    async fn token_grant(&self, grant_type: &str, body: Value) -> Result<AuthSession, CallError> {
        let mut url = self.endpoint("auth/v1/token")?;
        url.query_pairs_mut().append_pair("grant_type", grant_type);
        let request = self.request(Method::POST, url, None).json(&body);
        let response: TokenResponse = self.send_json(SERVICE, request).await?;
        Ok(response.into())
    }
}

#[async_trait]
impl AuthGateway for BackendClient {
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthSession, AuthError> {
        self.token_grant(
            "password",
            json!({ "email": email, "password": password }),
        )
        .await
        .map_err(|err| match err {
            CallError::Status { status, message }
                if matches!(
                    status,
                    StatusCode::BAD_REQUEST
                        | StatusCode::UNAUTHORIZED
                        | StatusCode::UNPROCESSABLE_ENTITY
                ) =>
            {
                AuthError::InvalidCredentials { message }
            }
            other => transport_error(other),
        })
    }

    async fn get_user(&self, token: &AccessToken) -> Result<SessionUser, AuthError> {
        let url = self.endpoint("auth/v1/user").map_err(transport_error)?;
        let request = self.request(Method::GET, url, Some(token));
        match self.send_json::<UserResponse>(SERVICE, request).await {
            Ok(user) => Ok(user.into()),
            Err(CallError::Status { status, .. })
                if matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) =>
            {
                Err(AuthError::Unauthorized)
            }
            Err(err) => Err(transport_error(err)),
        }
    }

    async fn refresh_session(&self, refresh_token: &str) -> Result<AuthSession, AuthError> {
        self.token_grant(
            "refresh_token",
            json!({ "refresh_token": refresh_token }),
        )
        .await
        .map_err(|err| match err {
            CallError::Status { status, .. }
                if matches!(
                    status,
                    StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN
                ) =>
            {
                AuthError::Unauthorized
            }
            other => transport_error(other),
        })
    }

    async fn sign_out(&self, token: &AccessToken) -> Result<(), AuthError> {
        let url = self.endpoint("auth/v1/logout").map_err(transport_error)?;
        let request = self.request(Method::POST, url, Some(token));
        match self.send(SERVICE, request).await {
            Ok(_) => Ok(()),
            // The session is already gone on the backend side.
            Err(CallError::Status { status, .. })
                if matches!(
                    status,
                    StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN | StatusCode::NOT_FOUND
                ) =>
            {
                Ok(())
            }
            Err(err) => Err(transport_error(err)),
        }
    }
}

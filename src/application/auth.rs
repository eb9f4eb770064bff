//! Session handling on top of the hosted auth service.
//!
//! The service never inspects tokens itself: every check is a round trip to
//! the backend's user endpoint. State changes are published on a broadcast
//! channel so other parts of the process can observe sign-ins, sign-outs and
//! refreshes.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::broadcast;
use tracing::{info, warn};

use crate::domain::auth::{AccessToken, AuthSession, AuthenticatedSession, SessionUser};

const AUTH_EVENT_CAPACITY: usize = 32;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("{message}")]
    InvalidCredentials { message: String },
    #[error("session is missing or expired")]
    Unauthorized,
    #[error("auth service rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },
    #[error("auth service unavailable: {0}")]
    Unavailable(String),
    #[error("auth service timeout")]
    Timeout,
}

#[async_trait]
pub trait AuthGateway: Send + Sync {
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthSession, AuthError>;

    /// Returns [`AuthError::Unauthorized`] when the token is not accepted.
    async fn get_user(&self, token: &AccessToken) -> Result<SessionUser, AuthError>;

    async fn refresh_session(&self, refresh_token: &str) -> Result<AuthSession, AuthError>;

    async fn sign_out(&self, token: &AccessToken) -> Result<(), AuthError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthEvent {
    SignedIn { user: SessionUser },
    SignedOut,
    TokenRefreshed { user: SessionUser },
}

/// Raw token values carried by the request cookies.
#[derive(Debug, Clone, Default)]
pub struct SessionTokens {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
}

/// What the response should do with the session cookies.
#[derive(Debug, Clone)]
pub enum CookieUpdate {
    Keep,
    Replace(AuthSession),
    Clear,
}

#[derive(Debug, Clone)]
pub struct SessionResolution {
    pub session: Option<AuthenticatedSession>,
    pub cookies: CookieUpdate,
}

impl SessionResolution {
    fn anonymous(cookies: CookieUpdate) -> Self {
        Self {
            session: None,
            cookies,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_some()
    }
}

#[derive(Clone)]
pub struct AuthService {
    gateway: Arc<dyn AuthGateway>,
    events: broadcast::Sender<AuthEvent>,
}

impl AuthService {
    pub fn new(gateway: Arc<dyn AuthGateway>) -> Self {
        let (events, _) = broadcast::channel(AUTH_EVENT_CAPACITY);
        Self { gateway, events }
    }

    /// Subscribe to session state changes.
    pub fn on_auth_state_change(&self) -> broadcast::Receiver<AuthEvent> {
        self.events.subscribe()
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, AuthError> {
        let email = email.trim();
        let password = password.trim();
        if email.is_empty() || password.is_empty() {
            return Err(AuthError::InvalidCredentials {
                message: "Email and password are required.".to_string(),
            });
        }

        let session = self.gateway.sign_in_with_password(email, password).await?;
        metrics::counter!("bagusblog_sign_ins_total").increment(1);
        info!(
            target = "bagusblog::application::auth",
            user_id = %session.user.id,
            "operator signed in"
        );
        self.publish(AuthEvent::SignedIn {
            user: session.user.clone(),
        });
        Ok(session)
    }

    pub async fn sign_out(&self, token: &AccessToken) -> Result<(), AuthError> {
        self.gateway.sign_out(token).await?;
        self.publish(AuthEvent::SignedOut);
        Ok(())
    }

    /// Establish the session state for one request.
    pub async fn resolve(&self, tokens: SessionTokens) -> SessionResolution {
        let SessionTokens {
            access_token,
            refresh_token,
        } = tokens;

        let Some(access_token) = access_token.filter(|value| !value.is_empty()) else {
            return match refresh_token.filter(|value| !value.is_empty()) {
                Some(refresh) => self.refresh(&refresh).await,
                None => SessionResolution::anonymous(CookieUpdate::Keep),
            };
        };

        let token = AccessToken::new(access_token);
        match self.gateway.get_user(&token).await {
            Ok(user) => SessionResolution {
                session: Some(AuthenticatedSession {
                    user,
                    access_token: token,
                }),
                cookies: CookieUpdate::Keep,
            },
            Err(AuthError::Unauthorized) => match refresh_token.filter(|value| !value.is_empty()) {
                Some(refresh) => self.refresh(&refresh).await,
                None => SessionResolution::anonymous(CookieUpdate::Clear),
            },
            Err(err) => {
                warn!(
                    target = "bagusblog::application::auth",
                    error = %err,
                    "session lookup failed; treating request as unauthenticated"
                );
                SessionResolution::anonymous(CookieUpdate::Keep)
            }
        }
    }

    async fn refresh(&self, refresh_token: &str) -> SessionResolution {
        match self.gateway.refresh_session(refresh_token).await {
            Ok(session) => {
                self.publish(AuthEvent::TokenRefreshed {
                    user: session.user.clone(),
                });
                SessionResolution {
                    session: Some(AuthenticatedSession {
                        user: session.user.clone(),
                        access_token: session.access_token.clone(),
                    }),
                    cookies: CookieUpdate::Replace(session),
                }
            }
            Err(AuthError::Unauthorized)
            | Err(AuthError::InvalidCredentials { .. })
            | Err(AuthError::Rejected { .. }) => SessionResolution::anonymous(CookieUpdate::Clear),
            Err(err) => {
                warn!(
                    target = "bagusblog::application::auth",
                    error = %err,
                    "session refresh failed"
                );
                SessionResolution::anonymous(CookieUpdate::Keep)
            }
        }
    }

    fn publish(&self, event: AuthEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }
}

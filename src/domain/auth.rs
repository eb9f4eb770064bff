//! Identity types handed out by the hosted auth service.

use std::fmt;

use uuid::Uuid;

/// Bearer token identifying a signed-in user to the backend.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(..)")
    }
}

/// The user behind a valid session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionUser {
    pub id: Uuid,
    pub email: Option<String>,
    pub display_name: Option<String>,
}

impl SessionUser {
    /// Name recorded as the author of posts written by this user.
    pub fn author_name(&self) -> Option<String> {
        self.display_name
            .as_deref()
            .or(self.email.as_deref())
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
    }
}

/// Token pair returned by sign-in and refresh.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub access_token: AccessToken,
    pub refresh_token: String,
    pub expires_in: i64,
    pub user: SessionUser,
}

/// A request that passed the route guard with a valid session.
#[derive(Debug, Clone)]
pub struct AuthenticatedSession {
    pub user: SessionUser,
    pub access_token: AccessToken,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn author_name_prefers_display_name() {
        let user = SessionUser {
            id: Uuid::nil(),
            email: Some("owner@example.com".into()),
            display_name: Some("Bagus".into()),
        };
        assert_eq!(user.author_name().as_deref(), Some("Bagus"));

        let user = SessionUser {
            display_name: Some("   ".into()),
            ..user
        };
        assert_eq!(user.author_name(), None);
    }

    #[test]
    fn access_token_debug_is_redacted() {
        let token = AccessToken::new("secret-jwt");
        assert_eq!(format!("{token:?}"), "AccessToken(..)");
    }
}

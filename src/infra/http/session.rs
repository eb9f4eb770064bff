//! Session cookies carrying the backend token pair.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use time::Duration;

use crate::application::auth::{CookieUpdate, SessionTokens};
use crate::domain::auth::AuthSession;

pub const ACCESS_COOKIE: &str = "bagusblog-access-token";
pub const REFRESH_COOKIE: &str = "bagusblog-refresh-token";

const COOKIE_MAX_AGE_DAYS: i64 = 30;

#[derive(Debug, Clone, Copy, Default)]
pub struct SessionCookies {
    secure: bool,
}

impl SessionCookies {
    pub fn new(secure: bool) -> Self {
        Self { secure }
    }

    pub fn tokens(&self, jar: &CookieJar) -> SessionTokens {
        SessionTokens {
            access_token: jar.get(ACCESS_COOKIE).map(|cookie| cookie.value().to_string()),
            refresh_token: jar
                .get(REFRESH_COOKIE)
                .map(|cookie| cookie.value().to_string()),
        }
    }

    pub fn store(&self, jar: CookieJar, session: &AuthSession) -> CookieJar {
        jar.add(self.cookie(ACCESS_COOKIE, session.access_token.as_str().to_string()))
            .add(self.cookie(REFRESH_COOKIE, session.refresh_token.clone()))
    }

    pub fn clear(&self, jar: CookieJar) -> CookieJar {
        jar.remove(Cookie::build(ACCESS_COOKIE).path("/"))
            .remove(Cookie::build(REFRESH_COOKIE).path("/"))
    }

    /// Jar to attach to the response, or `None` when nothing changes.
    pub fn apply_update(&self, jar: CookieJar, update: &CookieUpdate) -> Option<CookieJar> {
        match update {
            CookieUpdate::Keep => None,
            CookieUpdate::Replace(session) => Some(self.store(jar, session)),
            CookieUpdate::Clear => Some(self.clear(jar)),
        }
    }

    fn cookie(&self, name: &'static str, value: String) -> Cookie<'static> {
        Cookie::build((name, value))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.secure)
            .max_age(Duration::days(COOKIE_MAX_AGE_DAYS))
            .build()
    }
}

#[cfg(test)]
mod tests {
    use axum::http::{HeaderMap, HeaderValue, header::COOKIE};
    use uuid::Uuid;

    use super::*;
    use crate::domain::auth::{AccessToken, SessionUser};

    fn session() -> AuthSession {
        AuthSession {
            access_token: AccessToken::new("access-1"),
            refresh_token: "refresh-1".into(),
            expires_in: 3600,
            user: SessionUser {
                id: Uuid::nil(),
                email: Some("owner@example.com".into()),
                display_name: None,
            },
        }
    }

    #[test]
    fn tokens_are_read_from_request_cookies() {
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_static("bagusblog-access-token=a; bagusblog-refresh-token=r"),
        );
        let jar = CookieJar::from_headers(&headers);

        let tokens = SessionCookies::default().tokens(&jar);
        assert_eq!(tokens.access_token.as_deref(), Some("a"));
        assert_eq!(tokens.refresh_token.as_deref(), Some("r"));
    }

    #[test]
    fn stored_cookies_are_http_only() {
        let jar = SessionCookies::new(true).store(CookieJar::new(), &session());
        let access = jar.get(ACCESS_COOKIE).expect("access cookie");
        assert_eq!(access.value(), "access-1");
        assert_eq!(access.http_only(), Some(true));
        assert_eq!(access.secure(), Some(true));
        assert_eq!(access.same_site(), Some(SameSite::Lax));
    }

    #[test]
    fn keep_leaves_the_jar_alone() {
        let cookies = SessionCookies::default();
        assert!(cookies.apply_update(CookieJar::new(), &CookieUpdate::Keep).is_none());
        assert!(cookies.apply_update(CookieJar::new(), &CookieUpdate::Clear).is_some());
    }
}

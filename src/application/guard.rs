//! Path classification and redirect rules for the session guard.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteClass {
    Admin,
    Login,
    Public,
}

impl RouteClass {
    pub fn classify(path: &str) -> Self {
        if path.starts_with("/admin") {
            RouteClass::Admin
        } else if path.starts_with("/login") {
            RouteClass::Login
        } else {
            RouteClass::Public
        }
    }

    /// Whether the guard has to look up the session for this path.
    pub fn needs_session(self) -> bool {
        !matches!(self, RouteClass::Public)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    Pass,
    Redirect(&'static str),
}

pub const LOGIN_PATH: &str = "/login";
pub const ADMIN_PATH: &str = "/admin";

pub fn decide(class: RouteClass, authenticated: bool) -> GuardDecision {
    match (class, authenticated) {
        (RouteClass::Admin, false) => GuardDecision::Redirect(LOGIN_PATH),
        (RouteClass::Login, true) => GuardDecision::Redirect(ADMIN_PATH),
        _ => GuardDecision::Pass,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_uses_path_prefix() {
        assert_eq!(RouteClass::classify("/admin"), RouteClass::Admin);
        assert_eq!(RouteClass::classify("/admin/posts/3"), RouteClass::Admin);
        assert_eq!(RouteClass::classify("/login"), RouteClass::Login);
        assert_eq!(RouteClass::classify("/"), RouteClass::Public);
        assert_eq!(RouteClass::classify("/blog/1"), RouteClass::Public);
    }

    #[test]
    fn decisions_follow_session_state() {
        assert_eq!(
            decide(RouteClass::Admin, false),
            GuardDecision::Redirect("/login")
        );
        assert_eq!(decide(RouteClass::Admin, true), GuardDecision::Pass);
        assert_eq!(
            decide(RouteClass::Login, true),
            GuardDecision::Redirect("/admin")
        );
        assert_eq!(decide(RouteClass::Login, false), GuardDecision::Pass);
        assert_eq!(decide(RouteClass::Public, false), GuardDecision::Pass);
        assert_eq!(decide(RouteClass::Public, true), GuardDecision::Pass);
    }
}

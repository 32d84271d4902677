//! Hrefs of the pages this front end serves.
//!
//! Counterpart of `endpoints` for our own routes. Route patterns used by the
//! routers live next to the href builders so the two never drift apart.

pub fn home() -> String {
    "/".to_string()
}

pub mod auth {
    pub const LOGIN_ROUTE: &str = "/auth/login";
    pub const REGISTER_ROUTE: &str = "/auth/register";

    /// `/auth/login`, carrying a percent-encoded `redirectTo` when one is given.
    pub fn login(redirect_to: Option<&str>) -> String {
        with_redirect(LOGIN_ROUTE, redirect_to)
    }

    pub fn register(redirect_to: Option<&str>) -> String {
        with_redirect(REGISTER_ROUTE, redirect_to)
    }

    fn with_redirect(base: &str, redirect_to: Option<&str>) -> String {
        match redirect_to.filter(|target| !target.is_empty()) {
            Some(target) => format!("{base}?redirectTo={}", urlencoding::encode(target)),
            None => base.to_string(),
        }
    }
}

pub mod app {
    pub const ROOT_ROUTE: &str = "/app";

    /// Default landing page for authenticated users.
    pub fn dashboard() -> String {
        ROOT_ROUTE.to_string()
    }
}

pub mod public {
    pub const DISCUSSION_ROUTE: &str = "/public/discussions/{discussion_id}";

    pub fn discussion(id: &str) -> String {
        format!("/public/discussions/{}", urlencoding::encode(id))
    }
}

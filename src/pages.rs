//! Server-rendered page shells.
//!
//! Templates live in `templates/` and are compiled into the binary. Every page
//! that preloads data embeds the hydration snapshot through `hydration.html`.

use askama::Template;
use chrono::DateTime;

use crate::{
    endpoints::ENDPOINTS,
    models::{Comment, Discussion, User},
    paths,
};

/// Renders an epoch-milliseconds timestamp for display.
pub fn format_timestamp(millis: i64) -> String {
    DateTime::from_timestamp_millis(millis)
        .map(|at| at.format("%B %-d, %Y %H:%M").to_string())
        .unwrap_or_default()
}

fn author_name(author: Option<&User>) -> String {
    author
        .map(User::display_name)
        .unwrap_or_else(|| "Deleted user".to_string())
}

#[derive(Template)]
#[template(path = "landing.html")]
pub struct LandingPage {
    pub cta_href: String,
    pub cta_label: &'static str,
    pub hydration: String,
}

impl LandingPage {
    pub fn new(user: Option<&User>, hydration: String) -> Self {
        let (cta_href, cta_label) = match user {
            Some(_) => (paths::app::dashboard(), "Go to dashboard"),
            None => (paths::auth::login(None), "Get started"),
        };
        Self {
            cta_href,
            cta_label,
            hydration,
        }
    }
}

/// Which guest-only page the auth layout is wrapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthView {
    Login,
    Register,
}

#[derive(Template)]
#[template(path = "auth.html")]
pub struct AuthPage {
    pub title: &'static str,
    pub is_login: bool,
    pub submit_endpoint: &'static str,
    pub submit_label: &'static str,
    pub switch_href: String,
    pub switch_label: &'static str,
    pub home_href: String,
    pub hydration: String,
}

impl AuthPage {
    /// `redirect_to` is carried over to the sibling page link so the target
    /// survives switching between login and register.
    pub fn new(view: AuthView, redirect_to: Option<&str>, hydration: String) -> Self {
        match view {
            AuthView::Login => Self {
                title: "Log in to your account",
                is_login: true,
                submit_endpoint: ENDPOINTS.auth.login(),
                submit_label: "Log in",
                switch_href: paths::auth::register(redirect_to),
                switch_label: "Register",
                home_href: paths::home(),
                hydration,
            },
            AuthView::Register => Self {
                title: "Register your account",
                is_login: false,
                submit_endpoint: ENDPOINTS.auth.register(),
                submit_label: "Register",
                switch_href: paths::auth::login(redirect_to),
                switch_label: "Log in",
                home_href: paths::home(),
                hydration,
            },
        }
    }
}

pub struct CommentView {
    pub id: String,
    pub author: String,
    pub body: String,
    pub posted_at: String,
}

impl From<&Comment> for CommentView {
    fn from(comment: &Comment) -> Self {
        Self {
            id: comment.id.clone(),
            author: author_name(comment.author.as_ref()),
            body: comment.body.clone(),
            posted_at: format_timestamp(comment.created_at),
        }
    }
}

#[derive(Template)]
#[template(path = "discussion.html")]
pub struct DiscussionPage {
    pub discussion_id: String,
    pub title: String,
    pub body: String,
    pub author: String,
    pub posted_at: String,
    pub comments: Vec<CommentView>,
    pub has_more_comments: bool,
    pub signed_in: bool,
    pub login_href: String,
    pub hydration: String,
}

impl DiscussionPage {
    pub fn new(
        discussion: &Discussion,
        comments: &[Comment],
        has_more_comments: bool,
        viewer: Option<&User>,
        hydration: String,
    ) -> Self {
        Self {
            discussion_id: discussion.id.clone(),
            title: discussion.title.clone(),
            body: discussion.body.clone(),
            author: author_name(discussion.author.as_ref()),
            posted_at: format_timestamp(discussion.created_at),
            comments: comments.iter().map(CommentView::from).collect(),
            has_more_comments,
            signed_in: viewer.is_some(),
            login_href: paths::auth::login(Some(paths::public::discussion(&discussion.id).as_str())),
            hydration,
        }
    }
}

#[derive(Template)]
#[template(path = "dashboard.html")]
pub struct DashboardPage {
    pub name: String,
    pub email: String,
    pub role: String,
    pub hydration: String,
}

impl DashboardPage {
    pub fn new(user: &User, hydration: String) -> Self {
        Self {
            name: user.display_name(),
            email: user.email.clone(),
            role: user.role.clone(),
            hydration,
        }
    }
}

#[derive(Template)]
#[template(path = "not_found.html")]
pub struct NotFoundPage {
    pub home_href: String,
}

impl NotFoundPage {
    pub fn new() -> Self {
        Self {
            home_href: paths::home(),
        }
    }
}

impl Default for NotFoundPage {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Template, Default)]
#[template(path = "error.html")]
pub struct ErrorPage {}

impl ErrorPage {
    pub fn new() -> Self {
        Self {}
    }
}

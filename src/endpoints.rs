//! Backend endpoint registry.
//!
//! Every backend path the front end talks to is defined here once. Groups are
//! zero-sized structs so a path is reached as `ENDPOINTS.discussions.get("42")`,
//! and a misspelled operation fails to compile rather than at request time.
//!
//! Ids are percent-encoded into a single path segment, so a `/`, `?` or `#`
//! inside an id can never reach another backend path.

use std::borrow::Cow;

/// Percent-encodes `id` for use as one path segment.
///
/// `.` and `..` are left as they are and still collapse under URL
/// normalization; callers taking ids from a request must reject them (see
/// [`is_valid_id`]).
pub fn segment(id: &str) -> Cow<'_, str> {
    urlencoding::encode(id)
}

/// Whether `id` stays a single path segment once encoded.
pub fn is_valid_id(id: &str) -> bool {
    !matches!(id.trim(), "" | "." | "..")
}

/// The single, read-only registry instance.
pub static ENDPOINTS: Endpoints = Endpoints {
    auth: AuthEndpoints,
    discussions: DiscussionEndpoints,
    comments: CommentEndpoints,
    users: UserEndpoints,
    teams: TeamEndpoints,
    health: HealthEndpoints,
};

#[derive(Debug, Clone, Copy)]
pub struct Endpoints {
    pub auth: AuthEndpoints,
    pub discussions: DiscussionEndpoints,
    pub comments: CommentEndpoints,
    pub users: UserEndpoints,
    pub teams: TeamEndpoints,
    pub health: HealthEndpoints,
}

#[derive(Debug, Clone, Copy)]
pub struct AuthEndpoints;

impl AuthEndpoints {
    pub const LOGIN: &'static str = "/auth/login";
    pub const REGISTER: &'static str = "/auth/register";
    pub const LOGOUT: &'static str = "/auth/logout";
    pub const ME: &'static str = "/auth/me";

    pub fn login(&self) -> &'static str {
        Self::LOGIN
    }

    pub fn register(&self) -> &'static str {
        Self::REGISTER
    }

    pub fn logout(&self) -> &'static str {
        Self::LOGOUT
    }

    /// Identity of the caller; read by the session resolver.
    pub fn me(&self) -> &'static str {
        Self::ME
    }
}

#[derive(Debug, Clone, Copy)]
pub struct DiscussionEndpoints;

impl DiscussionEndpoints {
    const COLLECTION: &'static str = "/discussions";

    pub fn list(&self) -> &'static str {
        Self::COLLECTION
    }

    pub fn create(&self) -> &'static str {
        Self::COLLECTION
    }

    pub fn get(&self, id: &str) -> String {
        format!("{}/{}", Self::COLLECTION, segment(id))
    }

    pub fn update(&self, id: &str) -> String {
        self.get(id)
    }

    pub fn delete(&self, id: &str) -> String {
        self.get(id)
    }

    pub fn like(&self, id: &str) -> String {
        format!("{}/{}/like", Self::COLLECTION, segment(id))
    }

    pub fn unlike(&self, id: &str) -> String {
        format!("{}/{}/unlike", Self::COLLECTION, segment(id))
    }
}

#[derive(Debug, Clone, Copy)]
pub struct CommentEndpoints;

impl CommentEndpoints {
    /// Paginated with a `cursor` query parameter; omitted for the first page.
    pub fn list(&self, discussion_id: &str) -> String {
        format!("/discussions/{}/comments", segment(discussion_id))
    }

    pub fn create(&self, discussion_id: &str) -> String {
        self.list(discussion_id)
    }

    pub fn delete(&self, discussion_id: &str, comment_id: &str) -> String {
        format!(
            "/discussions/{}/comments/{}",
            segment(discussion_id),
            segment(comment_id)
        )
    }
}

#[derive(Debug, Clone, Copy)]
pub struct UserEndpoints;

impl UserEndpoints {
    const COLLECTION: &'static str = "/users";

    pub fn list(&self) -> &'static str {
        Self::COLLECTION
    }

    pub fn get(&self, id: &str) -> String {
        format!("{}/{}", Self::COLLECTION, segment(id))
    }

    pub fn update(&self, id: &str) -> String {
        self.get(id)
    }

    pub fn delete(&self, id: &str) -> String {
        self.get(id)
    }

    pub fn profile(&self) -> &'static str {
        "/users/profile"
    }
}

#[derive(Debug, Clone, Copy)]
pub struct TeamEndpoints;

impl TeamEndpoints {
    pub fn list(&self) -> &'static str {
        "/teams"
    }

    pub fn get(&self, id: &str) -> String {
        format!("/teams/{}", segment(id))
    }
}

#[derive(Debug, Clone, Copy)]
pub struct HealthEndpoints;

impl HealthEndpoints {
    pub fn check(&self) -> &'static str {
        "/healthcheck"
    }
}

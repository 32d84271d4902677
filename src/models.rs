use serde::{Deserialize, Serialize};
use ts_rs::TS;

// --- Backend Schemas (Deserialized from the API) ---

/// User
///
/// The identity returned by `GET /auth/me` and embedded as the author of
/// discussions and comments. Fields the backend omits fall back to defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, Default)]
#[serde(rename_all = "camelCase", default)]
#[ts(export)]
pub struct User {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    // 'ADMIN' or 'USER'. Only used for display here; no permission checks.
    pub role: String,
    pub team_id: String,
    pub bio: String,
    // Milliseconds since the Unix epoch.
    #[ts(type = "number")]
    pub created_at: i64,
}

impl User {
    pub fn display_name(&self) -> String {
        let name = format!("{} {}", self.first_name, self.last_name);
        let name = name.trim();
        if name.is_empty() {
            self.email.clone()
        } else {
            name.to_string()
        }
    }
}

/// Discussion
///
/// A single discussion thread, as returned by `GET /discussions/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, Default)]
#[serde(rename_all = "camelCase", default)]
#[ts(export)]
pub struct Discussion {
    pub id: String,
    pub title: String,
    pub body: String,
    pub team_id: String,
    pub author: Option<User>,
    #[ts(type = "number")]
    pub created_at: i64,
}

/// Comment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, Default)]
#[serde(rename_all = "camelCase", default)]
#[ts(export)]
pub struct Comment {
    pub id: String,
    pub body: String,
    pub discussion_id: String,
    pub author: Option<User>,
    #[ts(type = "number")]
    pub created_at: i64,
}

/// CommentsMeta
///
/// Pagination metadata. `next_cursor` is `None` on the last page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, Default)]
#[serde(rename_all = "camelCase", default)]
#[ts(export)]
pub struct CommentsMeta {
    pub next_cursor: Option<String>,
    #[ts(type = "number | null")]
    pub total: Option<u64>,
}

/// CommentsPage
///
/// One page of `GET /discussions/{id}/comments`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, Default)]
#[serde(default)]
#[ts(export)]
pub struct CommentsPage {
    pub data: Vec<Comment>,
    pub meta: CommentsMeta,
}

/// DataEnvelope
///
/// The backend wraps single entities as `{ "data": ... }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DataEnvelope<T> {
    pub data: T,
}

#![allow(dead_code)]

use async_trait::async_trait;
use discussion_portal::{
    AppConfig, AppState,
    backend::{Backend, BackendError, BackendState},
    context::RequestContext,
    endpoints::ENDPOINTS,
};
use serde_json::{Value, json};
use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    time::Duration,
};
use tokio::sync::Barrier;

// --- MOCK BACKEND IMPLEMENTATION ---

/// One recorded `get_json` call.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub path: String,
    pub query: Vec<(String, String)>,
    pub ctx: RequestContext,
}

/// Canned reply for a backend path.
#[derive(Debug, Clone)]
pub enum Reply {
    Json(Value),
    Status(u16),
}

/// Central control point for handler and preloader tests: canned replies per
/// path, optional per-path delays, and a record of every call made.
#[derive(Default)]
pub struct MockBackend {
    pub replies: HashMap<String, Reply>,
    pub delays: HashMap<String, Duration>,
    /// When set, every non-identity read waits here before answering. A batch
    /// only gets past it if its reads are in flight at the same time.
    pub rendezvous: Option<Arc<Barrier>>,
    pub calls: Mutex<Vec<RecordedCall>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(mut self, path: impl Into<String>, reply: Reply) -> Self {
        self.replies.insert(path.into(), reply);
        self
    }

    pub fn delay(mut self, path: impl Into<String>, delay: Duration) -> Self {
        self.delays.insert(path.into(), delay);
        self
    }

    pub fn rendezvous(mut self, parties: usize) -> Self {
        self.rendezvous = Some(Arc::new(Barrier::new(parties)));
        self
    }

    /// Backend with a discussion, its first comment page, and the given identity.
    pub fn with_discussion(discussion_id: &str, user: Option<Value>) -> Self {
        let me = match user {
            Some(user) => Reply::Json(json!({ "data": user })),
            None => Reply::Status(401),
        };
        Self::new()
            .reply(ENDPOINTS.auth.me(), me)
            .reply(
                ENDPOINTS.discussions.get(discussion_id),
                Reply::Json(discussion_body(discussion_id)),
            )
            .reply(
                ENDPOINTS.comments.list(discussion_id),
                Reply::Json(comments_body(discussion_id)),
            )
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_to(&self, path: &str) -> usize {
        self.calls().iter().filter(|call| call.path == path).count()
    }
}

#[async_trait]
impl Backend for MockBackend {
    async fn get_json(
        &self,
        path: &str,
        query: &[(String, String)],
        ctx: &RequestContext,
    ) -> Result<Value, BackendError> {
        self.calls.lock().unwrap().push(RecordedCall {
            path: path.to_string(),
            query: query.to_vec(),
            ctx: ctx.clone(),
        });

        if let Some(barrier) = &self.rendezvous {
            if path != ENDPOINTS.auth.me() {
                barrier.wait().await;
            }
        }
        if let Some(delay) = self.delays.get(path) {
            tokio::time::sleep(*delay).await;
        }

        match self.replies.get(path) {
            Some(Reply::Json(body)) => Ok(body.clone()),
            Some(Reply::Status(status)) => Err(BackendError::Status {
                status: *status,
                path: path.to_string(),
            }),
            None => Err(BackendError::Status {
                status: 404,
                path: path.to_string(),
            }),
        }
    }
}

// --- FIXTURES ---

pub fn user_json() -> Value {
    json!({
        "id": "user-1",
        "firstName": "Ada",
        "lastName": "Lovelace",
        "email": "ada@example.com",
        "role": "ADMIN",
        "teamId": "team-1",
        "bio": "",
        "createdAt": 1_700_000_000_000i64
    })
}

pub fn discussion_body(discussion_id: &str) -> Value {
    json!({
        "data": {
            "id": discussion_id,
            "title": "Release <planning>",
            "body": "What ships next sprint?",
            "teamId": "team-1",
            "author": user_json(),
            "createdAt": 1_700_000_000_000i64
        }
    })
}

pub fn comments_body(discussion_id: &str) -> Value {
    json!({
        "data": [
            {
                "id": "comment-1",
                "body": "The search rewrite.",
                "discussionId": discussion_id,
                "author": user_json(),
                "createdAt": 1_700_000_100_000i64
            }
        ],
        "meta": { "nextCursor": "comment-1", "total": 4 }
    })
}

pub fn app_state(backend: MockBackend) -> (AppState, Arc<MockBackend>) {
    let backend = Arc::new(backend);
    let state = AppState::new(backend.clone() as BackendState, AppConfig::default())
        .expect("default config forms a valid redirect policy");
    (state, backend)
}

/// Pulls the embedded hydration payload out of a rendered page.
pub fn hydration_payload(html: &str) -> Value {
    let open = r#"<script id="__HYDRATION_STATE__" type="application/json">"#;
    let start = html.find(open).expect("page embeds a hydration script") + open.len();
    let end = start + html[start..].find("</script>").expect("script is closed");
    serde_json::from_str(&html[start..end]).expect("hydration payload is valid JSON")
}

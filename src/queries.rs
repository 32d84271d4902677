//! Query definitions shared by the page handlers.
//!
//! Each builder pairs a cache key with the backend path it is filled from, so
//! the server prefetch and the client cache agree on keys.

use serde_json::{Value, json};

use crate::{
    endpoints::ENDPOINTS,
    preload::{PreloadBatch, ReadOperation},
};

/// Name of the pagination parameter on comment listings.
pub const COMMENTS_CURSOR_PARAM: &str = "cursor";

/// Key the resolved session user is cached under.
pub fn user_query_key() -> Vec<Value> {
    vec![json!("authenticated-user")]
}

pub fn discussion_query_key(discussion_id: &str) -> Vec<Value> {
    vec![json!("discussions"), json!(discussion_id)]
}

pub fn comments_query_key(discussion_id: &str) -> Vec<Value> {
    vec![json!("comments"), json!(discussion_id)]
}

pub fn discussion_query(discussion_id: &str) -> ReadOperation {
    ReadOperation::query(
        discussion_query_key(discussion_id),
        ENDPOINTS.discussions.get(discussion_id),
    )
}

/// First page of a discussion's comments. The first page carries no cursor.
pub fn infinite_comments_query(discussion_id: &str) -> ReadOperation {
    ReadOperation::infinite(
        comments_query_key(discussion_id),
        ENDPOINTS.comments.list(discussion_id),
        COMMENTS_CURSOR_PARAM,
        Value::Null,
    )
}

/// Everything the discussion page needs before its first render.
pub fn discussion_page_batch(discussion_id: &str) -> PreloadBatch {
    PreloadBatch::new()
        .with(discussion_query(discussion_id))
        .with(infinite_comments_query(discussion_id))
}

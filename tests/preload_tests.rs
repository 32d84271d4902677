mod common;

use common::{MockBackend, Reply, comments_body, discussion_body};
use discussion_portal::{
    context::RequestContext,
    endpoints::ENDPOINTS,
    models::{CommentsPage, DataEnvelope, Discussion},
    preload::{
        DehydratedState, FetchStatus, HydrationPayload, InfiniteData, PreloadBatch, PreloadError,
        QueryStatus, ReadOperation, preload,
    },
    queries,
};
use serde_json::{Value, json};
use std::time::Duration;

const TIMEOUT: Duration = Duration::from_secs(5);

fn ctx() -> RequestContext {
    RequestContext {
        cookie: Some("session=abc".to_string()),
        request_id: Some("req-1".to_string()),
    }
}

#[tokio::test]
async fn test_discussion_batch_dehydrates_both_queries_in_order() {
    let backend = MockBackend::with_discussion("42", None);
    let batch = queries::discussion_page_batch("42");

    let state = preload(&backend, &batch, &ctx(), TIMEOUT).await.unwrap();

    assert_eq!(state.queries.len(), 2);
    assert!(state.mutations.is_empty());
    assert_eq!(state.queries[0].query_hash, r#"["discussions","42"]"#);
    assert_eq!(state.queries[1].query_hash, r#"["comments","42"]"#);

    let detail = &state.queries[0].state;
    assert_eq!(detail.status, QueryStatus::Success);
    assert_eq!(detail.fetch_status, FetchStatus::Idle);
    assert_eq!(detail.data, discussion_body("42"));
    assert!(detail.data_updated_at > 0);

    // Infinite queries hold the first page plus its page param.
    assert_eq!(
        state.queries[1].state.data,
        json!({ "pages": [comments_body("42")], "pageParams": [null] })
    );
}

#[tokio::test]
async fn test_dehydrated_data_decodes_into_models() {
    let backend = MockBackend::with_discussion("42", None);
    let state = preload(&backend, &queries::discussion_page_batch("42"), &ctx(), TIMEOUT)
        .await
        .unwrap();

    let discussion: DataEnvelope<Discussion> = state
        .data_as(&queries::discussion_query_key("42"))
        .unwrap()
        .unwrap();
    assert_eq!(discussion.data.id, "42");
    assert_eq!(discussion.data.author.unwrap().first_name, "Ada");

    let comments: InfiniteData<CommentsPage> = state
        .data_as(&queries::comments_query_key("42"))
        .unwrap()
        .unwrap();
    assert_eq!(comments.pages[0].data.len(), 1);
    assert_eq!(comments.pages[0].meta.next_cursor.as_deref(), Some("comment-1"));

    assert!(
        state
            .data_as::<Value>(&queries::discussion_query_key("7"))
            .is_none()
    );
}

#[tokio::test]
async fn test_reads_forward_context_and_skip_first_cursor() {
    let backend = MockBackend::with_discussion("42", None);
    preload(&backend, &queries::discussion_page_batch("42"), &ctx(), TIMEOUT)
        .await
        .unwrap();

    let calls = backend.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(backend.calls_to(&ENDPOINTS.discussions.get("42")), 1);
    assert_eq!(backend.calls_to(&ENDPOINTS.comments.list("42")), 1);
    for call in &calls {
        assert_eq!(call.ctx, ctx());
        assert!(call.query.is_empty(), "first page is requested without a cursor");
    }
}

#[tokio::test]
async fn test_batch_reads_run_concurrently() {
    // Each read waits for the other; run one after the other they would never finish.
    let backend = MockBackend::with_discussion("42", None).rendezvous(2);
    let batch = queries::discussion_page_batch("42");

    let result = tokio::time::timeout(
        Duration::from_secs(2),
        preload(&backend, &batch, &ctx(), TIMEOUT),
    )
    .await;

    assert!(result.expect("reads were issued concurrently").is_ok());
}

#[tokio::test]
async fn test_one_failed_read_fails_the_whole_batch() {
    let backend = MockBackend::with_discussion("42", None)
        .reply(ENDPOINTS.comments.list("42"), Reply::Status(500));

    let err = preload(&backend, &queries::discussion_page_batch("42"), &ctx(), TIMEOUT)
        .await
        .unwrap_err();

    match err {
        PreloadError::UpstreamFetch { query_hash, .. } => {
            assert_eq!(query_hash, r#"["comments","42"]"#)
        }
        other => panic!("expected upstream fetch error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_upstream_status_is_exposed() {
    let backend = MockBackend::new();
    let err = preload(&backend, &queries::discussion_page_batch("404"), &ctx(), TIMEOUT)
        .await
        .unwrap_err();
    assert_eq!(err.upstream_status(), Some(404));
}

#[tokio::test]
async fn test_slow_read_times_out_the_batch() {
    let backend = MockBackend::with_discussion("42", None)
        .delay(ENDPOINTS.discussions.get("42"), Duration::from_secs(5));

    let err = preload(
        &backend,
        &queries::discussion_page_batch("42"),
        &ctx(),
        Duration::from_millis(50),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, PreloadError::Timeout { .. }));
    assert_eq!(err.upstream_status(), None);
}

#[tokio::test]
async fn test_empty_batch_yields_empty_state() {
    let backend = MockBackend::new();
    let state = preload(&backend, &PreloadBatch::new(), &ctx(), TIMEOUT)
        .await
        .unwrap();
    assert_eq!(state, DehydratedState::default());
    assert!(backend.calls().is_empty());
}

#[test]
fn test_infinite_read_sends_non_null_initial_param() {
    let operation = ReadOperation::infinite(vec![json!("comments")], "/c", "cursor", json!("abc"));
    assert_eq!(
        operation.request_params(),
        vec![("cursor".to_string(), "abc".to_string())]
    );

    let numbered = ReadOperation::infinite(vec![json!("comments")], "/c", "page", json!(1));
    assert_eq!(
        numbered.request_params(),
        vec![("page".to_string(), "1".to_string())]
    );
}

#[test]
fn test_hydration_payload_is_script_safe() {
    let mut state = DehydratedState::default();
    state.insert(discussion_portal::preload::DehydratedQuery::success(
        vec![json!("discussions"), json!("x")],
        json!({ "title": "</script><script>alert(1)</script> & more" }),
        1,
    ));

    let payload = HydrationPayload::new(state.clone(), Duration::from_secs(60));
    let script = payload.to_script_json().unwrap();

    assert!(!script.contains('<'));
    assert!(!script.contains('>'));
    assert!(!script.contains('&'));

    let decoded: HydrationPayload = serde_json::from_str(&script).unwrap();
    assert_eq!(decoded.state, state);
    assert_eq!(decoded.default_options.stale_time, 60_000);
    assert!(!decoded.default_options.retry);
    assert!(!decoded.default_options.refetch_on_window_focus);
}

#[test]
fn test_insert_replaces_existing_query() {
    let mut state = DehydratedState::default();
    let key = queries::user_query_key();
    state.insert(discussion_portal::preload::DehydratedQuery::success(
        key.clone(),
        Value::Null,
        1,
    ));
    state.insert(discussion_portal::preload::DehydratedQuery::success(
        key.clone(),
        json!({ "id": "user-1" }),
        2,
    ));

    assert_eq!(state.queries.len(), 1);
    assert_eq!(state.query(&key).unwrap().state.data_updated_at, 2);
}

//! Concurrent prefetch of a page's reads and the dehydrated snapshot they produce.
//!
//! The snapshot follows the wire shape of the TanStack Query `dehydrate()` output,
//! so the client-side cache can hydrate from it and skip the same requests until
//! the configured stale time runs out.

use std::time::Duration;

use chrono::Utc;
use futures::future::try_join_all;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::{Value, json};
use thiserror::Error;
use ts_rs::TS;

use crate::{
    backend::{Backend, BackendError},
    context::RequestContext,
};

/// PreloadError
///
/// A preload batch fails as a unit; the variant names the query that broke it.
#[derive(Debug, Error)]
pub enum PreloadError {
    #[error("upstream fetch for {query_hash} failed: {source}")]
    UpstreamFetch {
        query_hash: String,
        #[source]
        source: BackendError,
    },

    #[error("upstream fetch for {query_hash} timed out after {timeout:?}")]
    Timeout { query_hash: String, timeout: Duration },
}

impl PreloadError {
    /// Status the backend answered with, if the failure was an HTTP error response.
    pub fn upstream_status(&self) -> Option<u16> {
        match self {
            PreloadError::UpstreamFetch { source, .. } => source.status(),
            PreloadError::Timeout { .. } => None,
        }
    }
}

// --- Batch Description ---

/// ReadKind
#[derive(Debug, Clone, PartialEq)]
pub enum ReadKind {
    /// A plain query; the response body is cached as-is.
    Query,
    /// First page of a paginated query. Cached as `{ pages, pageParams }`.
    /// A null `initial_page_param` means the first page is requested without
    /// the page parameter.
    InfiniteQuery {
        page_param_name: &'static str,
        initial_page_param: Value,
    },
}

/// ReadOperation
///
/// One backend read plus the cache key its result is stored under.
#[derive(Debug, Clone, PartialEq)]
pub struct ReadOperation {
    pub query_key: Vec<Value>,
    pub path: String,
    pub params: Vec<(String, String)>,
    pub kind: ReadKind,
}

impl ReadOperation {
    pub fn query(query_key: Vec<Value>, path: impl Into<String>) -> Self {
        Self {
            query_key,
            path: path.into(),
            params: Vec::new(),
            kind: ReadKind::Query,
        }
    }

    pub fn infinite(
        query_key: Vec<Value>,
        path: impl Into<String>,
        page_param_name: &'static str,
        initial_page_param: Value,
    ) -> Self {
        Self {
            query_key,
            path: path.into(),
            params: Vec::new(),
            kind: ReadKind::InfiniteQuery {
                page_param_name,
                initial_page_param,
            },
        }
    }

    /// Compact JSON of the key, the same string the client cache hashes keys to.
    pub fn query_hash(&self) -> String {
        query_hash(&self.query_key)
    }

    /// Query string sent to the backend, including the initial page parameter.
    pub fn request_params(&self) -> Vec<(String, String)> {
        let mut params = self.params.clone();
        if let ReadKind::InfiniteQuery {
            page_param_name,
            initial_page_param,
        } = &self.kind
        {
            match initial_page_param {
                Value::Null => {}
                Value::String(value) => params.push((page_param_name.to_string(), value.clone())),
                other => params.push((page_param_name.to_string(), other.to_string())),
            }
        }
        params
    }

    fn cached_data(&self, body: Value) -> Value {
        match &self.kind {
            ReadKind::Query => body,
            ReadKind::InfiniteQuery {
                initial_page_param, ..
            } => json!({
                "pages": [body],
                "pageParams": [initial_page_param],
            }),
        }
    }
}

/// PreloadBatch
///
/// Independent reads that must all succeed before the page renders.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PreloadBatch {
    operations: Vec<ReadOperation>,
}

impl PreloadBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, operation: ReadOperation) -> Self {
        self.operations.push(operation);
        self
    }

    pub fn operations(&self) -> &[ReadOperation] {
        &self.operations
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }
}

// --- Dehydrated Snapshot ---

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum QueryStatus {
    Pending,
    Error,
    Success,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum FetchStatus {
    Fetching,
    Paused,
    Idle,
}

/// QueryState
///
/// The per-query state record the client cache restores verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct QueryState {
    pub data: Value,
    pub data_update_count: u32,
    // Milliseconds since the Unix epoch; staleness is measured from here.
    #[ts(type = "number")]
    pub data_updated_at: i64,
    pub error: Option<Value>,
    pub error_update_count: u32,
    #[ts(type = "number")]
    pub error_updated_at: i64,
    pub fetch_failure_count: u32,
    pub fetch_failure_reason: Option<Value>,
    pub fetch_meta: Option<Value>,
    pub is_invalidated: bool,
    pub status: QueryStatus,
    pub fetch_status: FetchStatus,
}

impl QueryState {
    pub fn success(data: Value, data_updated_at: i64) -> Self {
        Self {
            data,
            data_update_count: 1,
            data_updated_at,
            error: None,
            error_update_count: 0,
            error_updated_at: 0,
            fetch_failure_count: 0,
            fetch_failure_reason: None,
            fetch_meta: None,
            is_invalidated: false,
            status: QueryStatus::Success,
            fetch_status: FetchStatus::Idle,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct DehydratedQuery {
    pub query_key: Vec<Value>,
    pub query_hash: String,
    pub state: QueryState,
}

impl DehydratedQuery {
    pub fn success(query_key: Vec<Value>, data: Value, data_updated_at: i64) -> Self {
        Self {
            query_hash: query_hash(&query_key),
            query_key,
            state: QueryState::success(data, data_updated_at),
        }
    }
}

/// DehydratedState
///
/// The serialized cache handed to the client. Only ever built from a fully
/// successful batch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DehydratedState {
    pub mutations: Vec<Value>,
    pub queries: Vec<DehydratedQuery>,
}

impl DehydratedState {
    pub fn query(&self, query_key: &[Value]) -> Option<&DehydratedQuery> {
        let hash = query_hash(query_key);
        self.queries.iter().find(|query| query.query_hash == hash)
    }

    /// Decodes the cached data for `query_key`; `None` when the key is not cached.
    pub fn data_as<T: DeserializeOwned>(
        &self,
        query_key: &[Value],
    ) -> Option<Result<T, serde_json::Error>> {
        self.query(query_key)
            .map(|query| T::deserialize(&query.state.data))
    }

    /// Adds or replaces the entry for the query's key.
    pub fn insert(&mut self, query: DehydratedQuery) {
        match self
            .queries
            .iter_mut()
            .find(|existing| existing.query_hash == query.query_hash)
        {
            Some(existing) => *existing = query,
            None => self.queries.push(query),
        }
    }
}

/// InfiniteData
///
/// Cached shape of a paginated query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct InfiniteData<T> {
    pub pages: Vec<T>,
    pub page_params: Vec<Value>,
}

/// HydrationPayload
///
/// What a page embeds for the client: the snapshot plus the cache defaults
/// the client should run with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct HydrationPayload {
    pub state: DehydratedState,
    pub default_options: QueryDefaults,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct QueryDefaults {
    // Milliseconds.
    #[ts(type = "number")]
    pub stale_time: u64,
    pub retry: bool,
    pub refetch_on_window_focus: bool,
}

impl QueryDefaults {
    pub fn with_stale_time(stale_time: Duration) -> Self {
        Self {
            stale_time: u64::try_from(stale_time.as_millis()).unwrap_or(u64::MAX),
            retry: false,
            refetch_on_window_focus: false,
        }
    }
}

impl HydrationPayload {
    pub fn new(state: DehydratedState, stale_time: Duration) -> Self {
        Self {
            state,
            default_options: QueryDefaults::with_stale_time(stale_time),
        }
    }

    /// JSON that is safe to place inside a `<script>` element: `<`, `>` and `&`
    /// are emitted as unicode escapes so the payload can never close the tag.
    pub fn to_script_json(&self) -> Result<String, serde_json::Error> {
        let json = serde_json::to_string(self)?;
        Ok(json
            .replace('<', "\\u003c")
            .replace('>', "\\u003e")
            .replace('&', "\\u0026"))
    }
}

pub fn query_hash(query_key: &[Value]) -> String {
    Value::Array(query_key.to_vec()).to_string()
}

// --- Preloading ---

/// preload
///
/// Runs every read of `batch` concurrently and waits for all of them. The first
/// failure or timeout fails the whole call and drops the reads still in flight;
/// no partial snapshot is ever returned.
pub async fn preload(
    backend: &dyn Backend,
    batch: &PreloadBatch,
    ctx: &RequestContext,
    timeout: Duration,
) -> Result<DehydratedState, PreloadError> {
    tracing::debug!(reads = batch.len(), "preloading page data");

    let reads = batch
        .operations()
        .iter()
        .map(|operation| fetch_one(backend, operation, ctx, timeout));
    let bodies = try_join_all(reads).await?;

    let now = Utc::now().timestamp_millis();
    let queries = batch
        .operations()
        .iter()
        .zip(bodies)
        .map(|(operation, body)| {
            DehydratedQuery::success(operation.query_key.clone(), operation.cached_data(body), now)
        })
        .collect();

    Ok(DehydratedState {
        mutations: Vec::new(),
        queries,
    })
}

async fn fetch_one(
    backend: &dyn Backend,
    operation: &ReadOperation,
    ctx: &RequestContext,
    timeout: Duration,
) -> Result<Value, PreloadError> {
    let params = operation.request_params();
    let read = backend.get_json(&operation.path, &params, ctx);

    match tokio::time::timeout(timeout, read).await {
        Ok(Ok(body)) => Ok(body),
        Ok(Err(source)) => {
            tracing::warn!(query = %operation.query_hash(), error = %source, "preload read failed");
            Err(PreloadError::UpstreamFetch {
                query_hash: operation.query_hash(),
                source,
            })
        }
        Err(_) => {
            tracing::warn!(query = %operation.query_hash(), ?timeout, "preload read timed out");
            Err(PreloadError::Timeout {
                query_hash: operation.query_hash(),
                timeout,
            })
        }
    }
}

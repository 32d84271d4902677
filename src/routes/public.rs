use crate::{AppState, handlers, paths};
use axum::{Router, routing::get};

/// Public Router Module
///
/// Pages reachable by any client, anonymous or signed in. Handlers may resolve
/// the session to tailor the markup, but never deny access.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Liveness probe for load balancers; does not touch the backend.
        .route("/health", get(|| async { "ok" }))
        // GET /
        // Landing page.
        .route("/", get(handlers::landing))
        // GET /public/discussions/{discussion_id}
        // Discussion detail plus first comment page, preloaded concurrently and
        // embedded as a hydration snapshot.
        .route(
            paths::public::DISCUSSION_ROUTE,
            get(handlers::public_discussion),
        )
}

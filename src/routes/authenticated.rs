use crate::{AppState, handlers, paths};
use axum::{Router, routing::get};

/// Authenticated Router Module
///
/// Every route here relies on the session guard layered on in `create_router`:
/// handlers can take `Extension<Session>` and find it present.
pub fn authenticated_routes() -> Router<AppState> {
    Router::new()
        // GET /app
        // Dashboard; the default landing page after login.
        .route(paths::app::ROOT_ROUTE, get(handlers::dashboard))
}

use crate::{AppState, handlers, paths};
use axum::{Router, routing::get};

/// Guest Router Module
///
/// The two auth-entry pages. Both accept an optional `redirectTo` query parameter
/// and run the redirect policy once the session is resolved.
pub fn guest_routes() -> Router<AppState> {
    Router::new()
        // GET /auth/login?redirectTo=...
        .route(paths::auth::LOGIN_ROUTE, get(handlers::login))
        // GET /auth/register?redirectTo=...
        .route(paths::auth::REGISTER_ROUTE, get(handlers::register))
}

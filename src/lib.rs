use axum::{
    Router,
    extract::{FromRef, Request},
    http::HeaderName,
    middleware::{self, Next},
    response::{IntoResponse, Redirect, Response},
};

use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

pub mod backend;
pub mod config;
pub mod context;
pub mod endpoints;
pub mod error;
pub mod handlers;
pub mod models;
pub mod pages;
pub mod paths;
pub mod preload;
pub mod queries;
pub mod redirect;
pub mod session;

// Routers segregated by access rule (public, guest-only, authenticated).
pub mod routes;
use routes::{authenticated, guest, public};

// --- Public Re-exports ---

pub use backend::{Backend, BackendState, HttpBackend};
pub use config::AppConfig;
pub use redirect::{RedirectError, RedirectPolicy};
pub use session::Session;

/// AppState
///
/// Everything long-lived that handlers share: the backend client, the immutable
/// configuration, and the redirect policy derived from it. Nothing in here is
/// mutated after startup; per-request state travels in `RequestContext`.
#[derive(Clone)]
pub struct AppState {
    pub backend: BackendState,
    pub config: AppConfig,
    pub redirects: RedirectPolicy,
}

impl AppState {
    /// Fails when the configured app URL or landing path cannot serve as a
    /// redirect origin and default target.
    pub fn new(backend: BackendState, config: AppConfig) -> Result<Self, RedirectError> {
        let redirects = RedirectPolicy::new(&config.app_url, &config.landing_path)?;
        Ok(Self {
            backend,
            config,
            redirects,
        })
    }
}

// --- Axum FromRef Extractor Implementations ---

impl FromRef<AppState> for BackendState {
    fn from_ref(app_state: &AppState) -> BackendState {
        app_state.backend.clone()
    }
}

/// require_session
///
/// Guard for the `authenticated_routes`. Resolves the session once; anonymous
/// callers are redirected to login with the page they asked for as
/// `redirectTo`, signed-in callers continue with the session stored in the
/// request extensions.
async fn require_session(session: Session, mut request: Request, next: Next) -> Response {
    if !session.is_present() {
        let requested = request
            .uri()
            .path_and_query()
            .map(|target| target.as_str().to_string())
            .unwrap_or_else(paths::app::dashboard);
        tracing::debug!(%requested, "anonymous visitor on protected page");
        return Redirect::to(&paths::auth::login(Some(requested.as_str()))).into_response();
    }

    request.extensions_mut().insert(session);
    next.run(request).await
}

/// create_router
///
/// Assembles the page routers, applies the session guard, and wraps everything
/// in the request-id and tracing layers.
pub fn create_router(state: AppState) -> Router {
    let x_request_id = HeaderName::from_static(context::REQUEST_ID_HEADER);

    let base_router = Router::new()
        .merge(public::public_routes())
        .merge(guest::guest_routes())
        .merge(
            authenticated::authenticated_routes().route_layer(middleware::from_fn_with_state(
                state.clone(),
                require_session,
            )),
        )
        .fallback(handlers::not_found)
        .with_state(state);

    base_router.layer(
        ServiceBuilder::new()
            // Every request gets a UUID, which is also forwarded to the backend.
            .layer(SetRequestIdLayer::new(
                x_request_id.clone(),
                MakeRequestUuid,
            ))
            .layer(
                TraceLayer::new_for_http()
                    .make_span_with(trace_span_logger)
                    .on_response(
                        DefaultOnResponse::new()
                            .level(Level::INFO)
                            .latency_unit(tower_http::LatencyUnit::Millis),
                    ),
            )
            .layer(PropagateRequestIdLayer::new(x_request_id)),
    )
}

/// trace_span_logger
///
/// Span for `TraceLayer` carrying the request id, so every log line of one
/// page render (including its backend reads) is correlated.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get(context::REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}

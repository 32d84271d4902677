use discussion_portal::{
    AppState,
    backend::{BackendState, HttpBackend},
    config::{AppConfig, Env},
    create_router,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// main
///
/// Loads configuration, initializes logging, builds the backend client, and
/// serves the page routers.
#[tokio::main]
async fn main() {
    // 1. Configuration (fail-fast)
    dotenv::dotenv().ok();
    let config = AppConfig::load();

    // 2. Logging. RUST_LOG wins over the development defaults.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "discussion_portal=debug,tower_http=info".into());

    match config.env {
        Env::Local => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
        Env::Production => {
            // JSON lines for log aggregation.
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
    }

    tracing::info!("Application starting in {:?} mode", config.env);

    // 3. Backend client
    let backend = HttpBackend::new(&config.api_url, config.upstream_timeout)
        .expect("FATAL: Failed to build the backend HTTP client.");
    tracing::info!(api_url = %backend.base_url(), "backend client ready");
    let backend = Arc::new(backend) as BackendState;

    // 4. Shared state and router
    let bind_addr = config.bind_addr.clone();
    let app_state = AppState::new(backend, config)
        .expect("FATAL: APP_URL and LANDING_PATH must form a valid redirect target.");
    let app = create_router(app_state);

    // 5. Server
    let listener = TcpListener::bind(&bind_addr)
        .await
        .expect("FATAL: Failed to bind the HTTP listener. Check BIND_ADDR.");

    tracing::info!("Listening on {}", bind_addr);

    axum::serve(listener, app).await.expect("FATAL: HTTP server error.");
}

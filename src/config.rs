use std::{env, time::Duration};

use crate::paths;

/// AppConfig
///
/// Holds the front end's entire configuration state. Loaded once at startup and
/// immutable afterwards; handlers pull it out of the shared `AppState` via FromRef.
#[derive(Clone, Debug)]
pub struct AppConfig {
    // Runtime environment marker. Controls log format and fail-fast strictness.
    pub env: Env,
    // Base URL of the backend API, e.g. "http://localhost:8080/api".
    pub api_url: String,
    // Public origin this front end is served from. Redirect targets must stay on it.
    pub app_url: String,
    // Socket address the HTTP server binds to.
    pub bind_addr: String,
    // Upper bound for any single backend read issued while rendering a page.
    pub upstream_timeout: Duration,
    // Client-side cache staleness window shipped with every hydration snapshot.
    pub query_stale_time: Duration,
    // Where an already-authenticated visitor of a guest-only page lands by default.
    pub landing_path: String,
}

/// Env
///
/// Defines the runtime context. Local relaxes the required settings and uses
/// pretty logs; Production demands explicit settings and emits JSON logs.
#[derive(Clone, PartialEq, Debug)]
pub enum Env {
    Local,
    Production,
}

const DEFAULT_API_URL: &str = "http://localhost:8080/api";
const DEFAULT_APP_URL: &str = "http://localhost:3000";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_UPSTREAM_TIMEOUT_MS: u64 = 10_000;
const DEFAULT_QUERY_STALE_TIME_MS: u64 = 60_000;

impl Default for AppConfig {
    /// Safe, non-panicking values for test state scaffolding.
    fn default() -> Self {
        Self {
            env: Env::Local,
            api_url: DEFAULT_API_URL.to_string(),
            app_url: DEFAULT_APP_URL.to_string(),
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            upstream_timeout: Duration::from_millis(DEFAULT_UPSTREAM_TIMEOUT_MS),
            query_stale_time: Duration::from_millis(DEFAULT_QUERY_STALE_TIME_MS),
            landing_path: paths::app::dashboard(),
        }
    }
}

impl AppConfig {
    /// load
    ///
    /// Reads the configuration from environment variables, following the
    /// **fail-fast** principle.
    ///
    /// # Panics
    /// Panics when `API_URL` or `APP_URL` is missing in production, or when a
    /// numeric setting is present but not a valid number of milliseconds.
    pub fn load() -> Self {
        let env_str = env::var("APP_ENV").unwrap_or_else(|_| "local".to_string());
        let env = match env_str.as_str() {
            "production" => Env::Production,
            _ => Env::Local,
        };

        let (api_url, app_url) = match env {
            Env::Production => (
                env::var("API_URL").expect("FATAL: API_URL must be set in production."),
                env::var("APP_URL").expect("FATAL: APP_URL must be set in production."),
            ),
            Env::Local => (
                env::var("API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string()),
                env::var("APP_URL").unwrap_or_else(|_| DEFAULT_APP_URL.to_string()),
            ),
        };

        Self {
            env,
            api_url: api_url.trim_end_matches('/').to_string(),
            app_url: app_url.trim_end_matches('/').to_string(),
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string()),
            upstream_timeout: millis_var("UPSTREAM_TIMEOUT_MS", DEFAULT_UPSTREAM_TIMEOUT_MS),
            query_stale_time: millis_var("QUERY_STALE_TIME_MS", DEFAULT_QUERY_STALE_TIME_MS),
            landing_path: env::var("LANDING_PATH").unwrap_or_else(|_| paths::app::dashboard()),
        }
    }
}

fn millis_var(key: &str, default: u64) -> Duration {
    let millis = match env::var(key) {
        Ok(raw) => raw
            .parse::<u64>()
            .unwrap_or_else(|_| panic!("FATAL: {key} must be a whole number of milliseconds.")),
        Err(_) => default,
    };
    Duration::from_millis(millis)
}

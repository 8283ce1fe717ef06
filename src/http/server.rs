//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Build runtime state from validated configuration
//! - Create the Axum router with the optimize and session handlers
//! - Wire up middleware (tracing, timeout, body limit, session bootstrap)
//! - Bind to a listener and serve with graceful shutdown

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::routing::{get, post};
use axum::{middleware, Json, Router};
use serde_json::json;
use tokio::net::TcpListener;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::config::{Environment, GatewayConfig};
use crate::http::optimize::optimize_handler;
use crate::security::{MemoryStore, RateLimitStore, RedisStore};
use crate::session::{session_bootstrap, TokenSigner};
use crate::upstream::GenerationClient;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub environment: Environment,
    pub signer: Arc<TokenSigner>,
    pub limiter: Arc<dyn RateLimitStore>,
    pub generator: Arc<GenerationClient>,
    pub cookie_max_age_secs: u64,
    pub retry_after_secs: u64,
}

impl AppState {
    /// Build runtime state from validated configuration. Connects to
    /// Redis when configured, otherwise falls back to the in-process
    /// store (development only; production validation requires Redis).
    pub async fn from_config(config: &GatewayConfig) -> anyhow::Result<Self> {
        let signer = TokenSigner::new(config.environment, config.session.secret.as_deref())
            .context("session signing unavailable")?;

        let window = Duration::from_secs(config.rate_limit.window_secs);
        let limiter: Arc<dyn RateLimitStore> = match &config.rate_limit.redis_url {
            Some(url) => {
                let store = RedisStore::connect(url, window, config.rate_limit.max_requests)
                    .await
                    .context("failed to connect to the rate limit store")?;
                tracing::info!("rate limiting backed by shared Redis store");
                Arc::new(store)
            }
            None => {
                tracing::info!("rate limiting backed by in-process store");
                Arc::new(MemoryStore::new(window, config.rate_limit.max_requests))
            }
        };

        let generator = GenerationClient::new(&config.upstream)
            .context("failed to build the generation API client")?;

        Ok(Self {
            environment: config.environment,
            signer: Arc::new(signer),
            limiter,
            generator: Arc::new(generator),
            cookie_max_age_secs: config.session.cookie_max_age_secs,
            retry_after_secs: config.rate_limit.window_secs,
        })
    }
}

/// HTTP server for the optimizer gateway.
pub struct GatewayServer {
    router: Router,
}

impl GatewayServer {
    /// Create a new server over prepared state.
    pub fn new(config: &GatewayConfig, state: AppState) -> Self {
        Self {
            router: Self::build_router(config, state),
        }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &GatewayConfig, state: AppState) -> Router {
        Router::new()
            .route("/optimize", post(optimize_handler))
            .route("/session", get(session_handler))
            .layer(middleware::from_fn_with_state(
                state.clone(),
                session_bootstrap,
            ))
            .layer(RequestBodyLimitLayer::new(config.limits.max_body_bytes))
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.timeouts.request_secs,
            )))
            .layer(TraceLayer::new_for_http())
            .with_state(state)
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(self, listener: TcpListener) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// GET /session. The bootstrap middleware mints the cookie; the body
/// just acknowledges, so non-browser clients have a first call to make.
async fn session_handler() -> Json<serde_json::Value> {
    Json(json!({ "ok": true }))
}

/// Wait for Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("shutdown signal received");
}

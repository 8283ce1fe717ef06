//! Optimizer Gateway
//!
//! A request-admission layer in front of a text-generation API,
//! built with Tokio and Axum.
//!
//! # Architecture Overview
//!
//! ```text
//!                    ┌──────────────────────────────────────────────────┐
//!                    │                OPTIMIZER GATEWAY                  │
//!                    │                                                   │
//!   Client Request   │  ┌─────────┐   ┌──────────┐   ┌───────────────┐  │
//!   ─────────────────┼─▶│  http   │──▶│ session  │──▶│   security    │  │
//!                    │  │ server  │   │bootstrap │   │ rate limiter  │  │
//!                    │  └─────────┘   │+ verify  │   │ (mem / redis) │  │
//!                    │                └──────────┘   └───────┬───────┘  │
//!                    │                                       │          │
//!                    │                                       ▼          │
//!                    │                ┌──────────┐   ┌───────────────┐  │
//!   Streamed Result  │                │ prompt   │   │   upstream    │  │
//!   ◀────────────────┼────────────────│ escape + │──▶│  generation   │◀─┼── Generation
//!                    │                │ template │   │    client     │  │    API
//!                    │                └──────────┘   └───────────────┘  │
//!                    │                                                   │
//!                    │  ┌─────────────────────────────────────────────┐ │
//!                    │  │        Cross-Cutting: config, observability  │ │
//!                    │  └─────────────────────────────────────────────┘ │
//!                    └──────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use optimizer_gateway::http::server::AppState;
use optimizer_gateway::{config, observability, GatewayServer};

#[derive(Parser)]
#[command(name = "optimizer-gateway", version, about = "Request-admission gateway for a text-generation API")]
struct CliArgs {
    /// Path to a TOML config file. Omit to run on defaults plus
    /// environment overrides.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();
    let config =
        config::load_config(args.config.as_deref()).context("failed to load configuration")?;

    // RUST_LOG wins; the configured level is the fallback.
    let default_filter = format!(
        "optimizer_gateway={level},tower_http={level}",
        level = config.observability.log_level
    );
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&default_filter)),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        environment = %config.environment,
        bind_address = %config.listener.bind_address,
        max_requests = config.rate_limit.max_requests,
        window_secs = config.rate_limit.window_secs,
        shared_store = config.rate_limit.redis_url.is_some(),
        "configuration loaded"
    );

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            observability::metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "failed to parse metrics address"
            );
        }
    }

    let state = AppState::from_config(&config)
        .await
        .context("failed to initialize gateway state")?;

    let listener = TcpListener::bind(&config.listener.bind_address)
        .await
        .with_context(|| format!("failed to bind {}", config.listener.bind_address))?;
    tracing::info!(address = %listener.local_addr()?, "listening for connections");

    let server = GatewayServer::new(&config, state);
    server.run(listener).await?;

    tracing::info!("shutdown complete");
    Ok(())
}

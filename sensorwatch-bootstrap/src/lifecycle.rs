use std::time::Duration;

use anyhow::Result;
use axum::Router;
use chrono::{DateTime, Utc};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use sensorwatch_application::commands::run_detection;
use sensorwatch_application::dtos::RunRequest;
use sensorwatch_application::AppState;
use sensorwatch_infrastructure::{schedule_detection, AppConfig};
use sensorwatch_interfaces_http::build_router;

use crate::context::AppContext;

const MAX_BODY_BYTES: usize = 64 * 1024;

fn build_router_with_layers(state: AppState) -> Router {
    let timeout = Duration::from_secs(state.config.request_timeout_seconds.max(1));
    build_router(state)
        .layer(CorsLayer::permissive())
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(TimeoutLayer::new(timeout))
        .layer(TraceLayer::new_for_http())
}

/// Runs one detection and prints the report JSON to stdout. Stdout sinks
/// write to stderr for the run so the output stays parseable.
pub async fn run_once(
    config: &AppConfig,
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
) -> Result<()> {
    let context = AppContext::new(&config.one_shot()).await?;
    let report = run_detection(&context.state, RunRequest { start, end }).await?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

pub async fn run_standalone(config: &AppConfig) -> Result<()> {
    let context = AppContext::new(config).await?;
    let state = context.state;

    let scheduler = tokio::spawn(schedule_detection(state.clone()));

    if state.config.http_enabled {
        let app = build_router_with_layers(state.clone());
        let addr: std::net::SocketAddr = state.config.bind_addr.parse()?;
        let listener = TcpListener::bind(addr).await?;
        info!("listening on {}", addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;
    } else {
        info!(
            "scheduler running every {}s, http disabled",
            state.config.interval_seconds
        );
        shutdown_signal().await;
    }

    scheduler.abort();
    info!("shutting down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                error!("sigterm handler unavailable: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

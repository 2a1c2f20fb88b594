use crate::probe;
use crate::state::AppState;
use anyhow::Context;
use axum::{
    Json, Router,
    extract::{Query, State, rejection::QueryRejection},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::time::Duration;
use tracing::{debug, info};

#[derive(Debug, Deserialize)]
pub struct ApiParams {
    format: Option<String>,
}

#[derive(Debug, Serialize)]
struct ColorInfo<'a> {
    color: &'a str,
    hostname: &'a str,
}

pub async fn index(State(state): State<AppState>) -> Html<String> {
    Html(format!(
        "<h1 style=\"color:{};\">Hello from Color API</h1>\n    <h2>Hostname: {}</h2>",
        state.color, state.hostname
    ))
}

// A query string that fails to deserialize is treated like no query at all.
pub async fn api(
    State(state): State<AppState>,
    params: Result<Query<ApiParams>, QueryRejection>,
) -> Response {
    let wants_json = matches!(
        params.ok().and_then(|Query(p)| p.format).as_deref(),
        Some("json")
    );

    if wants_json {
        Json(ColorInfo {
            color: &state.color,
            hostname: &state.hostname,
        })
        .into_response()
    } else {
        format!("Color: {}, Hostname: {}", state.color, state.hostname).into_response()
    }
}

pub async fn readiness_probe(State(state): State<AppState>) -> Response {
    if state.probes.fail_readiness {
        debug!("Readiness probe failing as configured");
        StatusCode::SERVICE_UNAVAILABLE.into_response()
    } else {
        "Ready".into_response()
    }
}

pub async fn startup_probe() -> impl IntoResponse {
    "Ready"
}

pub async fn liveness_probe(State(state): State<AppState>) -> Response {
    if state.probes.fail_liveness {
        debug!("Liveness probe failing as configured");
        StatusCode::SERVICE_UNAVAILABLE.into_response()
    } else {
        "Healthy".into_response()
    }
}

pub fn create_app(state: AppState, enable_probes: bool) -> Router {
    let mut router = Router::new()
        .route("/", get(index))
        .route("/api", get(api));

    if enable_probes {
        router = router
            .route("/ready", get(readiness_probe))
            .route("/up", get(startup_probe))
            .route("/health", get(liveness_probe));
    }

    router.with_state(state)
}

/// Binds `addr` and serves `app` until the server stops. A startup delay blocks the current
/// thread before the bind, so connections are refused until it is over.
pub async fn serve(
    addr: SocketAddr,
    app: Router,
    startup_delay: Option<Duration>,
) -> anyhow::Result<()> {
    if let Some(delay) = startup_delay {
        probe::delay_startup(delay);
    }

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind webserver to {}", addr))?;
    info!("Color API listening on {}", addr);
    axum::serve(listener, app)
        .await
        .context("Webserver terminated unexpectedly")?;

    Ok(())
}

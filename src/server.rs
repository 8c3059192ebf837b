use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Json, Response};
use axum::routing::get;
use axum::Router;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{info, warn};

use crate::figures::Dashboard;
use crate::metrics::MetricsTable;
use crate::page::render_page;

/// Everything the dashboard serves, built once before the listener starts.
pub struct ServerState {
    pub html: String,
    pub figures: Value,
    pub metrics: MetricsTable,
}

impl ServerState {
    pub fn new(dashboard: &Dashboard, metrics: MetricsTable, plotly_src: &str) -> Result<Self> {
        Ok(Self {
            html: render_page(dashboard, plotly_src)?,
            figures: dashboard.figures_json().context("serialize dashboard figures")?,
            metrics,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct MetricsQuery {
    pub category: Option<String>,
}

pub fn router(state: Arc<ServerState>) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/api/figures", get(figures_handler))
        .route("/api/metrics", get(metrics_handler))
        .route("/healthz", get(health_handler))
        .with_state(state)
}

async fn index_handler(State(state): State<Arc<ServerState>>) -> Html<String> {
    Html(state.html.clone())
}

async fn figures_handler(State(state): State<Arc<ServerState>>) -> Json<Value> {
    Json(state.figures.clone())
}

async fn metrics_handler(
    State(state): State<Arc<ServerState>>,
    Query(query): Query<MetricsQuery>,
) -> Response {
    match query.category.as_deref() {
        None => Json(state.metrics.records().cloned().collect::<Vec<_>>()).into_response(),
        Some(category) => match state.metrics.category(category) {
            Some(block) => Json(block.teams.clone()).into_response(),
            None => (
                StatusCode::NOT_FOUND,
                Json(json!({ "error": format!("unknown category: {category}") })),
            )
                .into_response(),
        },
    }
}

async fn health_handler() -> &'static str {
    "ok"
}

pub async fn serve(state: Arc<ServerState>, addr: SocketAddr) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("bind dashboard listener on {addr}"))?;
    info!("dashboard running at http://{addr}");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("dashboard server failed")?;

    info!("dashboard shut down cleanly");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!("failed to listen for ctrl-c: {err}");
        std::future::pending::<()>().await;
    }
}

//! HTTP endpoint server using Axum

use axum::{
    extract::{Path, Request, State},
    http::StatusCode,
    middleware::Next,
    response::{Json, Response},
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{error, info, Level};

use crate::metrics::Metrics;
use crate::pipeline::ScannerEngine;
use crate::reports::{catalog, ReportId};

#[derive(Clone)]
pub struct AppState {
    pub health: Arc<RwLock<HealthStatus>>,
    pub metrics: Arc<Metrics>,
    pub start_time: Arc<Instant>,
    pub engine: Arc<ScannerEngine>,
}

#[derive(Clone, Debug)]
pub struct HealthStatus {
    pub status: String,
}

impl Default for HealthStatus {
    fn default() -> Self {
        Self {
            status: "healthy".to_string(),
        }
    }
}

pub async fn health_check(State(state): State<AppState>) -> Result<Json<Value>, StatusCode> {
    let health = state.health.read().await;
    let uptime_seconds = state.start_time.elapsed().as_secs();
    Ok(Json(json!({
        "status": health.status,
        "uptime_seconds": uptime_seconds,
        "service": "gapscan-scanner-engine"
    })))
}

pub async fn metrics_handler(State(state): State<AppState>) -> Result<String, StatusCode> {
    state
        .metrics
        .export()
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}

/// Middleware to track HTTP request metrics
async fn metrics_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    state.metrics.http_requests_in_flight.inc();
    let response = next.run(request).await;
    let status = response.status();
    let duration = start.elapsed();
    state.metrics.http_requests_in_flight.dec();

    state.metrics.http_requests_total.inc();
    state
        .metrics
        .http_request_duration_seconds
        .observe(duration.as_secs_f64());

    if status.is_server_error() {
        tracing::error!(
            method = %method,
            path = %path,
            status = %status,
            duration_ms = duration.as_millis(),
            "HTTP request error"
        );
    }

    response
}

/// List the report catalog (ids and display names).
async fn list_reports() -> Json<Value> {
    let reports: Vec<Value> = catalog()
        .iter()
        .map(|def| {
            json!({
                "id": def.id.as_str(),
                "display_name": def.display_name,
            })
        })
        .collect();
    Json(json!(reports))
}

/// Ranked entries for one named report.
async fn get_report(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, StatusCode> {
    let report_id = ReportId::parse(&id).ok_or(StatusCode::NOT_FOUND)?;
    let entries = state.engine.report(report_id).await;
    Ok(Json(json!({
        "id": report_id.as_str(),
        "count": entries.len(),
        "entries": entries,
    })))
}

/// Trigger one pipeline pass, queued behind any in-flight pass. Runs
/// even outside the session window.
async fn refresh_now(State(state): State<AppState>) -> Result<Json<Value>, StatusCode> {
    state.engine.refresh_now().await.map_err(|e| {
        error!(error = %e, "manual refresh failed");
        StatusCode::BAD_GATEWAY
    })?;
    let published = state
        .engine
        .last_published()
        .await
        .map(|set| set.len())
        .unwrap_or(0);
    Ok(Json(json!({
        "status": "refreshed",
        "published": published,
    })))
}

async fn session_status(State(state): State<AppState>) -> Json<Value> {
    Json(json!({ "active": state.engine.is_session_active() }))
}

/// Stored news items for one symbol.
async fn get_news(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
) -> Json<Value> {
    let items = state.engine.news(&symbol).await;
    Json(json!(items))
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(metrics_handler))
        .route("/api/reports", get(list_reports))
        .route("/api/reports/{id}", get(get_report))
        .route("/api/news/{symbol}", get(get_news))
        .route("/api/refresh", post(refresh_now))
        .route("/api/session", get(session_status))
        .layer(
            ServiceBuilder::new()
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(DefaultMakeSpan::new().level(Level::DEBUG))
                        .on_request(DefaultOnRequest::new().level(Level::DEBUG))
                        .on_response(DefaultOnResponse::new().level(Level::DEBUG)),
                )
                .layer(axum::middleware::from_fn_with_state(
                    state.clone(),
                    metrics_middleware,
                ))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

pub async fn start_server(
    port: u16,
    state: AppState,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let app = create_router(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;

    info!(port = port, "HTTP server listening on port {}", port);
    axum::serve(listener, app).await?;

    Ok(())
}

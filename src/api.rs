use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::{get, post};
use axum::Router;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::error;
use uuid::Uuid;

use crate::manager::{AlertManager, DEFAULT_ACTIVE_LIMIT, DEFAULT_RESOLVER, DEFAULT_SUMMARY_HOURS};
use crate::models::alert::{ActiveAlert, AlertCandidate};
use crate::models::summary::AlertSummary;

const MAX_LIST_LIMIT: i64 = 500;

#[derive(Clone)]
pub struct AppState {
    pub manager: Arc<AlertManager>,
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/alerts", get(list_alerts).post(create_alert))
        .route("/alerts/summary", get(get_summary))
        .route("/alerts/{id}/resolve", post(resolve_alert))
        .with_state(state)
}

async fn health_check() -> &'static str {
    "ok"
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct AlertListResponse {
    pub alerts: Vec<ActiveAlert>,
    pub count: usize,
}

async fn list_alerts(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<AlertListResponse>, StatusCode> {
    let limit = query.limit.unwrap_or(DEFAULT_ACTIVE_LIMIT).clamp(1, MAX_LIST_LIMIT);

    match state.manager.get_active_alerts(limit).await {
        Ok(alerts) => Ok(Json(AlertListResponse {
            count: alerts.len(),
            alerts,
        })),
        Err(e) => {
            error!("Failed to list active alerts: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CreateAlertResponse {
    pub created: bool,
}

async fn create_alert(
    State(state): State<AppState>,
    Json(candidate): Json<AlertCandidate>,
) -> Result<(StatusCode, Json<CreateAlertResponse>), StatusCode> {
    match state.manager.create_alert(candidate).await {
        Ok(true) => Ok((StatusCode::CREATED, Json(CreateAlertResponse { created: true }))),
        Ok(false) => Ok((StatusCode::OK, Json(CreateAlertResponse { created: false }))),
        Err(e) => {
            error!("Failed to create alert: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ResolveRequest {
    pub resolved_by: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ResolveResponse {
    pub resolved: bool,
}

async fn resolve_alert(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<ResolveRequest>,
) -> Result<Json<ResolveResponse>, StatusCode> {
    let resolved_by = request.resolved_by.as_deref().unwrap_or(DEFAULT_RESOLVER);

    match state.manager.resolve_alert(id, resolved_by).await {
        Ok(resolved) => Ok(Json(ResolveResponse { resolved })),
        Err(e) => {
            error!("Failed to resolve alert {}: {}", id, e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SummaryQuery {
    pub hours: Option<u32>,
}

async fn get_summary(
    State(state): State<AppState>,
    Query(query): Query<SummaryQuery>,
) -> Result<Json<AlertSummary>, StatusCode> {
    let hours = query.hours.unwrap_or(DEFAULT_SUMMARY_HOURS);

    match state.manager.get_alert_summary(hours).await {
        Ok(summary) => Ok(Json(summary)),
        Err(e) => {
            error!("Failed to summarize alerts: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

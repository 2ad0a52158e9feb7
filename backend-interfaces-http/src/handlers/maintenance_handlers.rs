use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;

use backend_application::commands::maintenance_commands;
use backend_application::queries::maintenance_queries;
use backend_application::AppState;
use backend_domain::{
    FleetQuery, MaintenanceRecord, MaintenanceSummary, NewMaintenanceRecord, UrgentItem,
};

use crate::error::HttpError;
use crate::middleware::user_context;

pub async fn maintenance_summary(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<MaintenanceSummary>, HttpError> {
    let ctx = user_context(&state, &headers).await?;
    let summary = maintenance_queries::maintenance_summary(&state, &ctx).await?;
    Ok(Json(summary))
}

pub async fn record_maintenance(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<NewMaintenanceRecord>,
) -> Result<(StatusCode, Json<MaintenanceRecord>), HttpError> {
    let ctx = user_context(&state, &headers).await?;
    let saved = maintenance_commands::record_maintenance(&state, &ctx, payload).await?;
    Ok((StatusCode::CREATED, Json(saved)))
}

pub async fn urgent_items(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<FleetQuery>,
) -> Result<Json<Vec<UrgentItem>>, HttpError> {
    let ctx = user_context(&state, &headers).await?;
    let items = maintenance_queries::fleet_urgent_items(&state, &ctx, query).await?;
    Ok(Json(items))
}

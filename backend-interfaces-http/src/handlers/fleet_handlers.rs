use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::Json;

use backend_application::queries::{compliance_queries, refill_analysis_queries};
use backend_application::AppState;
use backend_domain::{ComplianceSummary, FleetQuery, RefillAnalysis};

use crate::error::HttpError;
use crate::middleware::user_context;

pub async fn refill_analysis(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<FleetQuery>,
) -> Result<Json<RefillAnalysis>, HttpError> {
    let ctx = user_context(&state, &headers).await?;
    let analysis = refill_analysis_queries::refill_analysis(&state, &ctx, query).await?;
    Ok(Json(analysis))
}

pub async fn compliance_summary(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<FleetQuery>,
) -> Result<Json<ComplianceSummary>, HttpError> {
    let ctx = user_context(&state, &headers).await?;
    let summary = compliance_queries::compliance_summary(&state, &ctx, query).await?;
    Ok(Json(summary))
}

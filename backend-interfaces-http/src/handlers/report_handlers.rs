use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use chrono::Utc;

use backend_application::commands::email_report_commands::{self, SendNowRequest};
use backend_application::commands::report_dispatch_commands;
use backend_application::queries::email_report_queries;
use backend_application::AppState;
use backend_domain::{
    DispatchResults, EmailReportPreference, EmailReportPreferenceUpdate, ReportRequest,
};

use crate::error::HttpError;
use crate::middleware::{authorize, user_context};

pub async fn get_preferences(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<EmailReportPreference>, HttpError> {
    let ctx = user_context(&state, &headers).await?;
    let preference = email_report_queries::get_preferences(&state, &ctx).await?;
    Ok(Json(preference))
}

pub async fn save_preferences(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<EmailReportPreferenceUpdate>,
) -> Result<Json<EmailReportPreference>, HttpError> {
    let ctx = user_context(&state, &headers).await?;
    let saved = email_report_commands::save_preferences(&state, &ctx, payload).await?;
    Ok(Json(saved))
}

pub async fn send_now(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Option<Json<SendNowRequest>>,
) -> Result<Json<ReportRequest>, HttpError> {
    let ctx = user_context(&state, &headers).await?;
    let request = payload.map(|Json(body)| body).unwrap_or_default();
    let sent = email_report_commands::send_now(&state, &ctx, request).await?;
    Ok(Json(sent))
}

pub async fn dispatch_reports(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<DispatchResults>, HttpError> {
    if !authorize(&state.config, &headers) {
        return Err(HttpError::Unauthorized);
    }
    let results = report_dispatch_commands::dispatch_scheduled_reports(&state, Utc::now()).await?;
    Ok(Json(results))
}

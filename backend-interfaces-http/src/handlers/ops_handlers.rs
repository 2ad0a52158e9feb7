use axum::extract::State;
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;
use tokio::time::error::Elapsed;
use tokio::time::{timeout, Duration};
use tracing::error;

use backend_application::AppState;

use crate::middleware::authorize;

#[derive(Debug, Serialize)]
pub struct ReadyStatus {
    vendor: &'static str,
    platform: &'static str,
}

fn readiness_status(
    outcome: Result<anyhow::Result<bool>, Elapsed>,
    name: &str,
    secs: u64,
) -> &'static str {
    match outcome {
        Ok(Ok(true)) => "ok",
        Ok(Ok(false)) => "error",
        Ok(Err(err)) => {
            error!("{} ready check failed: {}", name, err);
            "error"
        }
        Err(_) => {
            error!("{} ready check timeout after {}s", name, secs);
            "timeout"
        }
    }
}

pub async fn health_live() -> StatusCode {
    StatusCode::OK
}

pub async fn health_ready(State(state): State<AppState>) -> impl IntoResponse {
    let timeout_secs = state.config.request_timeout_seconds.max(1);
    let timeout_duration = Duration::from_secs(timeout_secs);
    let (vendor, platform) = tokio::join!(
        timeout(timeout_duration, state.health.check_vendor()),
        timeout(timeout_duration, state.health.check_platform()),
    );
    let status = ReadyStatus {
        vendor: readiness_status(vendor, "vendor", timeout_secs),
        platform: readiness_status(platform, "platform", timeout_secs),
    };
    let code = if status.vendor == "ok" && status.platform == "ok" {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (code, Json(status))
}

pub async fn metrics_prometheus(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> impl IntoResponse {
    if !authorize(&state.config, &headers) {
        return (StatusCode::UNAUTHORIZED, "unauthorized".to_string()).into_response();
    }
    let payload = state.metrics.render_prometheus();
    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/plain; version=0.0.4; charset=utf-8"),
    );
    (headers, payload).into_response()
}

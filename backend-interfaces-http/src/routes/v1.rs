use axum::routing::{get, post};
use axum::Router;

use backend_application::AppState;

use crate::handlers::{
    fleet_handlers, maintenance_handlers, ops_handlers, report_handlers, user_handlers,
};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(
            "/v1/refills/analysis",
            get(fleet_handlers::refill_analysis),
        )
        .route(
            "/v1/compliance/summary",
            get(fleet_handlers::compliance_summary),
        )
        .route(
            "/v1/fleet/urgent-items",
            get(maintenance_handlers::urgent_items),
        )
        .route("/v1/maintenance", post(maintenance_handlers::record_maintenance))
        .route(
            "/v1/maintenance/summary",
            get(maintenance_handlers::maintenance_summary),
        )
        .route(
            "/v1/reports/preferences",
            get(report_handlers::get_preferences).put(report_handlers::save_preferences),
        )
        .route("/v1/reports/send-now", post(report_handlers::send_now))
        .route(
            "/v1/reports/dispatch",
            post(report_handlers::dispatch_reports),
        )
        .route("/v1/me", get(user_handlers::current_user))
        .route("/v1/ops/health/live", get(ops_handlers::health_live))
        .route("/v1/ops/health/ready", get(ops_handlers::health_ready))
        .route(
            "/v1/ops/metrics/prometheus",
            get(ops_handlers::metrics_prometheus),
        )
        .with_state(state)
}

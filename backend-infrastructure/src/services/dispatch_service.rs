use std::time::Duration;

use chrono::Utc;
use tracing::{error, info};

use backend_application::commands::report_dispatch_commands::dispatch_scheduled_reports;
use backend_application::AppState;

pub fn dispatch_interval(state: &AppState) -> Duration {
    Duration::from_secs(state.config.dispatch_interval_minutes.max(1) * 60)
}

/// Runs the scheduled report batch forever, once per dispatch interval.
pub async fn schedule_dispatch(state: AppState) {
    let interval = dispatch_interval(&state);
    info!("report dispatcher running every {:?}", interval);
    loop {
        tokio::time::sleep(interval).await;

        if let Err(err) = dispatch_scheduled_reports(&state, Utc::now()).await {
            error!("scheduled report dispatch failed: {}", err);
        }
    }
}

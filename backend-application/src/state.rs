use std::sync::Arc;

use backend_domain::ports::{
    HealthCheckService, MaintenanceRepository, PreferenceRepository, ReportDispatcher,
    UserDirectory, VendorApi,
};
use backend_domain::services::ForecastSettings;
use backend_domain::{AccessPolicy, RuntimeConfig};
use tokio::sync::RwLock;

use crate::Metrics;

#[derive(Clone)]
pub struct AppState {
    pub config: RuntimeConfig,
    pub vendor: Arc<dyn VendorApi>,
    pub user_directory: Arc<dyn UserDirectory>,
    pub preference_repo: Arc<dyn PreferenceRepository>,
    pub maintenance_repo: Arc<dyn MaintenanceRepository>,
    pub report_dispatcher: Arc<dyn ReportDispatcher>,
    pub health: Arc<dyn HealthCheckService>,
    pub access_policies: Arc<RwLock<Vec<AccessPolicy>>>,
    pub metrics: Arc<Metrics>,
}

impl AppState {
    pub fn forecast_settings(&self) -> ForecastSettings {
        ForecastSettings {
            refill_threshold_litres: self.config.refill_threshold_litres,
            litres_per_wash: self.config.litres_per_wash,
            scan_window_days: self.config.scan_window_days,
            horizon_days: self.config.forecast_horizon_days,
        }
    }
}

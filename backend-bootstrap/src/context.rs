use std::sync::Arc;

use anyhow::Result;
use tokio::sync::RwLock;
use tracing::{info, warn};

use backend_application::{AppState, Metrics};
use backend_domain::ports::PreferenceRepository;
use backend_domain::{ConfigRepository, PreferenceStore};
use backend_infrastructure::{
    AppConfig, ConfigFileRepository, DefaultHealthService, EloraClient, PlatformClient,
    PreferenceFileRepository,
};

pub struct AppContext {
    pub state: AppState,
}

impl AppContext {
    pub async fn new(config: AppConfig) -> Result<Self> {
        let runtime_config = config.to_runtime_config()?;
        let vendor = Arc::new(EloraClient::new(&config.to_vendor_config())?);
        let platform = Arc::new(PlatformClient::new(&config.to_platform_config())?);

        let preference_repo: Arc<dyn PreferenceRepository> = match runtime_config.preference_store
        {
            PreferenceStore::Platform => platform.clone(),
            PreferenceStore::File => {
                info!(
                    "storing report preferences in {}",
                    runtime_config.preferences_path
                );
                Arc::new(PreferenceFileRepository::new(
                    runtime_config.preferences_path.clone(),
                ))
            }
        };

        let access_policies = match &runtime_config.access_policies_path {
            Some(path) => ConfigFileRepository::new()
                .load_access_policies(path)
                .await
                .unwrap_or_else(|err| {
                    warn!("failed to load access policies from {}: {}", path, err);
                    Vec::new()
                }),
            None => Vec::new(),
        };

        let state = AppState {
            config: runtime_config,
            vendor: vendor.clone(),
            user_directory: platform.clone(),
            preference_repo: preference_repo.clone(),
            maintenance_repo: platform.clone(),
            report_dispatcher: platform,
            health: Arc::new(DefaultHealthService::new(vendor, preference_repo)),
            access_policies: Arc::new(RwLock::new(access_policies)),
            metrics: Arc::new(Metrics::default()),
        };

        Ok(Self { state })
    }
}

use std::sync::Arc;

use async_trait::async_trait;
use backend_domain::ports::{HealthCheckService, PreferenceRepository, VendorApi};

pub struct DefaultHealthService {
    vendor: Arc<dyn VendorApi>,
    preference_repo: Arc<dyn PreferenceRepository>,
}

impl DefaultHealthService {
    pub fn new(vendor: Arc<dyn VendorApi>, preference_repo: Arc<dyn PreferenceRepository>) -> Self {
        Self {
            vendor,
            preference_repo,
        }
    }
}

#[async_trait]
impl HealthCheckService for DefaultHealthService {
    async fn check_vendor(&self) -> anyhow::Result<bool> {
        self.vendor
            .list_customers()
            .await
            .map(|_| true)
            .map_err(anyhow::Error::from)
    }

    async fn check_platform(&self) -> anyhow::Result<bool> {
        self.preference_repo
            .list()
            .await
            .map(|_| true)
            .map_err(anyhow::Error::from)
    }
}

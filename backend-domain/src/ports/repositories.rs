use async_trait::async_trait;

use crate::entities::{AccessPolicy, EmailReportPreference, MaintenanceRecord};
use crate::errors::PlatformError;

#[async_trait]
pub trait PreferenceRepository: Send + Sync {
    async fn list(&self) -> Result<Vec<EmailReportPreference>, PlatformError>;
    async fn find_by_email(
        &self,
        email: &str,
    ) -> Result<Option<EmailReportPreference>, PlatformError>;
    async fn create(
        &self,
        preference: &EmailReportPreference,
    ) -> Result<EmailReportPreference, PlatformError>;
    /// Replaces the stored record identified by `preference.id`.
    async fn update(
        &self,
        preference: &EmailReportPreference,
    ) -> Result<EmailReportPreference, PlatformError>;
}

#[async_trait]
pub trait MaintenanceRepository: Send + Sync {
    /// Most recent services first.
    async fn list_records(&self) -> Result<Vec<MaintenanceRecord>, PlatformError>;
    async fn create_record(
        &self,
        record: &MaintenanceRecord,
    ) -> Result<MaintenanceRecord, PlatformError>;
}

#[async_trait]
pub trait ConfigRepository: Send + Sync {
    async fn load_access_policies(&self, path: &str) -> anyhow::Result<Vec<AccessPolicy>>;
}

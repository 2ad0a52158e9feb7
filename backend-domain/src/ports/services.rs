use async_trait::async_trait;

use crate::entities::{
    Customer, Device, RefillEvent, ReportRequest, ScanEvent, Site, UserProfile, Vehicle,
};
use crate::errors::{PlatformError, VendorError};
use crate::value_objects::VendorFilter;

/// Read access to the wash vendor's fleet data.
#[async_trait]
pub trait VendorApi: Send + Sync {
    async fn list_customers(&self) -> Result<Vec<Customer>, VendorError>;
    async fn list_sites(&self, customer: Option<&str>) -> Result<Vec<Site>, VendorError>;
    async fn list_vehicles(&self, filter: &VendorFilter) -> Result<Vec<Vehicle>, VendorError>;
    async fn list_scans(&self, filter: &VendorFilter) -> Result<Vec<ScanEvent>, VendorError>;
    async fn list_refills(&self, filter: &VendorFilter) -> Result<Vec<RefillEvent>, VendorError>;
    async fn list_devices(&self, status: Option<&str>) -> Result<Vec<Device>, VendorError>;
}

#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn current_user(&self, session_token: &str) -> Result<UserProfile, PlatformError>;
}

#[async_trait]
pub trait ReportDispatcher: Send + Sync {
    async fn send_report(&self, request: &ReportRequest) -> Result<(), PlatformError>;
}

#[async_trait]
pub trait HealthCheckService: Send + Sync {
    async fn check_vendor(&self) -> anyhow::Result<bool>;
    async fn check_platform(&self) -> anyhow::Result<bool>;
}

// In-memory ports for application tests

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use tokio::sync::RwLock;

use backend_domain::ports::{
    HealthCheckService, MaintenanceRepository, PreferenceRepository, ReportDispatcher,
    UserDirectory, VendorApi,
};
use backend_domain::{
    Customer, Device, EmailReportPreference, MaintenanceRecord, PlatformError, PreferenceStore,
    RefillEvent, ReportFrequency, ReportRequest, RuntimeConfig, ScanEvent, Site, UserContext,
    UserProfile, Vehicle, VendorError, VendorFilter,
};

use crate::queries::user_queries::resolve_user_context;
use crate::{AppState, Metrics};

pub(crate) fn runtime_config() -> RuntimeConfig {
    RuntimeConfig {
        bind_addr: "127.0.0.1:0".to_string(),
        api_token: None,
        max_body_bytes: 1024 * 1024,
        request_timeout_seconds: 5,
        refill_threshold_litres: 200.0,
        litres_per_wash: 5.0,
        scan_window_days: 30,
        forecast_horizon_days: 365.0,
        dispatch_enabled: false,
        dispatch_interval_minutes: 15,
        default_utc_offset_minutes: 600,
        user_info_max_retries: 3,
        user_info_backoff_ms: 1,
        access_policies_path: None,
        preference_store: PreferenceStore::File,
        preferences_path: "./preferences.json".to_string(),
    }
}

pub(crate) fn day(offset: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0)
        .single()
        .expect("valid date")
        + Duration::days(offset)
}

pub(crate) fn profile(email: &str, role: &str) -> UserProfile {
    UserProfile {
        id: format!("user-{email}"),
        email: email.to_string(),
        full_name: None,
        role: Some(role.to_string()),
        assigned_sites: Vec::new(),
        assigned_vehicles: Vec::new(),
        utc_offset_minutes: None,
    }
}

pub(crate) fn refill(
    site: &str,
    customer: &str,
    offset: i64,
    delivered: f64,
    start: Option<f64>,
    new_total: f64,
) -> RefillEvent {
    RefillEvent {
        site: site.to_string(),
        customer: customer.to_string(),
        date: day(offset),
        delivered_litres: delivered,
        start_litres: start,
        new_total_litres: new_total,
        total_ex_gst: delivered * 1.5,
        product_name: None,
    }
}

pub(crate) fn scan(site_name: &str, site_ref: &str, offset: i64) -> ScanEvent {
    ScanEvent {
        vehicle_ref: "V-1".to_string(),
        site_ref: site_ref.to_string(),
        site_name: site_name.to_string(),
        timestamp: day(offset),
    }
}

pub(crate) fn site(id: &str, name: &str, customer: &str) -> Site {
    Site {
        id: id.to_string(),
        name: name.to_string(),
        customer_ref: String::new(),
        customer_name: customer.to_string(),
    }
}

pub(crate) fn vehicle(id: &str, site_id: &str, washes: f64, target: f64) -> Vehicle {
    Vehicle {
        id: id.to_string(),
        name: id.to_string(),
        site_id: site_id.to_string(),
        customer_name: "Boral".to_string(),
        washes_completed: washes,
        target,
    }
}

pub(crate) fn device(id: &str, site_name: &str, last_scan_at: Option<DateTime<Utc>>) -> Device {
    Device {
        id: id.to_string(),
        status: "active".to_string(),
        site_name: site_name.to_string(),
        last_scan_at,
    }
}

pub(crate) fn service(
    vehicle: &str,
    served: i64,
    next: Option<i64>,
    cost: Option<f64>,
) -> MaintenanceRecord {
    MaintenanceRecord {
        id: Some(format!("m-{vehicle}-{served}")),
        vehicle_id: vehicle.to_string(),
        service_type: "oil_change".to_string(),
        service_date: Some(day(served)),
        next_service_date: next.map(day),
        cost,
        notes: None,
    }
}

pub(crate) fn stored_preference(email: &str, frequency: ReportFrequency) -> EmailReportPreference {
    EmailReportPreference {
        id: Some(format!("pref-{email}")),
        enabled: true,
        frequency,
        report_types: vec!["compliance".to_string()],
        ..EmailReportPreference::defaults_for(email)
    }
}

#[derive(Default)]
struct VendorData {
    sites: Vec<Site>,
    vehicles: Vec<Vehicle>,
    scans: Vec<ScanEvent>,
    refills: Vec<RefillEvent>,
    devices: Vec<Device>,
}

#[derive(Default)]
pub(crate) struct FakeVendor {
    data: Mutex<VendorData>,
    failure: Mutex<Option<u16>>,
}

impl FakeVendor {
    pub(crate) fn set_sites(&self, sites: Vec<Site>) {
        self.data.lock().expect("vendor lock").sites = sites;
    }

    pub(crate) fn set_vehicles(&self, vehicles: Vec<Vehicle>) {
        self.data.lock().expect("vendor lock").vehicles = vehicles;
    }

    pub(crate) fn set_scans(&self, scans: Vec<ScanEvent>) {
        self.data.lock().expect("vendor lock").scans = scans;
    }

    pub(crate) fn set_refills(&self, refills: Vec<RefillEvent>) {
        self.data.lock().expect("vendor lock").refills = refills;
    }

    pub(crate) fn set_devices(&self, devices: Vec<Device>) {
        self.data.lock().expect("vendor lock").devices = devices;
    }

    pub(crate) fn fail_with(&self, status: u16) {
        *self.failure.lock().expect("vendor lock") = Some(status);
    }

    fn check(&self) -> Result<(), VendorError> {
        match *self.failure.lock().expect("vendor lock") {
            Some(status) => Err(VendorError::status(status, String::new())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl VendorApi for FakeVendor {
    async fn list_customers(&self) -> Result<Vec<Customer>, VendorError> {
        self.check()?;
        Ok(Vec::new())
    }

    async fn list_sites(&self, _customer: Option<&str>) -> Result<Vec<Site>, VendorError> {
        self.check()?;
        Ok(self.data.lock().expect("vendor lock").sites.clone())
    }

    async fn list_vehicles(&self, _filter: &VendorFilter) -> Result<Vec<Vehicle>, VendorError> {
        self.check()?;
        Ok(self.data.lock().expect("vendor lock").vehicles.clone())
    }

    async fn list_scans(&self, _filter: &VendorFilter) -> Result<Vec<ScanEvent>, VendorError> {
        self.check()?;
        Ok(self.data.lock().expect("vendor lock").scans.clone())
    }

    async fn list_refills(&self, _filter: &VendorFilter) -> Result<Vec<RefillEvent>, VendorError> {
        self.check()?;
        Ok(self.data.lock().expect("vendor lock").refills.clone())
    }

    async fn list_devices(&self, status: Option<&str>) -> Result<Vec<Device>, VendorError> {
        self.check()?;
        let devices = self.data.lock().expect("vendor lock").devices.clone();
        Ok(devices
            .into_iter()
            .filter(|device| status.map_or(true, |wanted| device.status == wanted))
            .collect())
    }
}

#[derive(Default)]
pub(crate) struct FakeDirectory {
    user: Mutex<Option<UserProfile>>,
    failures: AtomicU32,
    calls: AtomicU32,
}

impl FakeDirectory {
    pub(crate) fn fail_next(&self, count: u32) {
        self.failures.store(count, Ordering::SeqCst);
    }

    pub(crate) fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl UserDirectory for FakeDirectory {
    async fn current_user(&self, _session_token: &str) -> Result<UserProfile, PlatformError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let remaining = self.failures.load(Ordering::SeqCst);
        if remaining > 0 {
            self.failures.store(remaining - 1, Ordering::SeqCst);
            return Err(PlatformError::Transport("connection reset".to_string()));
        }
        self.user
            .lock()
            .expect("directory lock")
            .clone()
            .ok_or(PlatformError::Unauthorized)
    }
}

#[derive(Default)]
pub(crate) struct MemoryPreferences {
    items: Mutex<Vec<EmailReportPreference>>,
}

impl MemoryPreferences {
    pub(crate) fn seed(&self, items: Vec<EmailReportPreference>) {
        *self.items.lock().expect("preference lock") = items;
    }

    pub(crate) fn all(&self) -> Vec<EmailReportPreference> {
        self.items.lock().expect("preference lock").clone()
    }

    pub(crate) fn by_email(&self, email: &str) -> Option<EmailReportPreference> {
        self.all().into_iter().find(|pref| pref.user_email == email)
    }
}

#[async_trait]
impl PreferenceRepository for MemoryPreferences {
    async fn list(&self) -> Result<Vec<EmailReportPreference>, PlatformError> {
        Ok(self.all())
    }

    async fn find_by_email(
        &self,
        email: &str,
    ) -> Result<Option<EmailReportPreference>, PlatformError> {
        Ok(self.by_email(email))
    }

    async fn create(
        &self,
        preference: &EmailReportPreference,
    ) -> Result<EmailReportPreference, PlatformError> {
        let created = EmailReportPreference {
            id: Some(uuid::Uuid::new_v4().to_string()),
            ..preference.clone()
        };
        self.items
            .lock()
            .expect("preference lock")
            .push(created.clone());
        Ok(created)
    }

    async fn update(
        &self,
        preference: &EmailReportPreference,
    ) -> Result<EmailReportPreference, PlatformError> {
        let mut items = self.items.lock().expect("preference lock");
        let slot = items
            .iter_mut()
            .find(|item| item.id.is_some() && item.id == preference.id)
            .ok_or_else(|| PlatformError::Storage("no such preference".to_string()))?;
        *slot = preference.clone();
        Ok(preference.clone())
    }
}

#[derive(Default)]
pub(crate) struct MemoryMaintenance {
    records: Mutex<Vec<MaintenanceRecord>>,
}

impl MemoryMaintenance {
    pub(crate) fn seed(&self, records: Vec<MaintenanceRecord>) {
        *self.records.lock().expect("maintenance lock") = records;
    }

    pub(crate) fn all(&self) -> Vec<MaintenanceRecord> {
        self.records.lock().expect("maintenance lock").clone()
    }
}

#[async_trait]
impl MaintenanceRepository for MemoryMaintenance {
    async fn list_records(&self) -> Result<Vec<MaintenanceRecord>, PlatformError> {
        let mut records = self.all();
        records.sort_by(|a, b| b.service_date.cmp(&a.service_date));
        Ok(records)
    }

    async fn create_record(
        &self,
        record: &MaintenanceRecord,
    ) -> Result<MaintenanceRecord, PlatformError> {
        let created = MaintenanceRecord {
            id: Some(uuid::Uuid::new_v4().to_string()),
            ..record.clone()
        };
        self.records
            .lock()
            .expect("maintenance lock")
            .push(created.clone());
        Ok(created)
    }
}

#[derive(Default)]
pub(crate) struct RecordingDispatcher {
    sent: Mutex<Vec<ReportRequest>>,
    failing: Mutex<Vec<String>>,
}

impl RecordingDispatcher {
    pub(crate) fn fail_for(&self, email: &str) {
        self.failing
            .lock()
            .expect("dispatcher lock")
            .push(email.to_string());
    }

    pub(crate) fn sent(&self) -> Vec<ReportRequest> {
        self.sent.lock().expect("dispatcher lock").clone()
    }
}

#[async_trait]
impl ReportDispatcher for RecordingDispatcher {
    async fn send_report(&self, request: &ReportRequest) -> Result<(), PlatformError> {
        if self
            .failing
            .lock()
            .expect("dispatcher lock")
            .contains(&request.user_email)
        {
            return Err(PlatformError::Status {
                status: 500,
                body: "mail provider rejected the message".to_string(),
            });
        }
        self.sent
            .lock()
            .expect("dispatcher lock")
            .push(request.clone());
        Ok(())
    }
}

pub(crate) struct AlwaysHealthy;

#[async_trait]
impl HealthCheckService for AlwaysHealthy {
    async fn check_vendor(&self) -> anyhow::Result<bool> {
        Ok(true)
    }

    async fn check_platform(&self) -> anyhow::Result<bool> {
        Ok(true)
    }
}

pub(crate) struct TestHarness {
    pub state: AppState,
    pub vendor: Arc<FakeVendor>,
    pub directory: Arc<FakeDirectory>,
    pub preferences: Arc<MemoryPreferences>,
    pub maintenance: Arc<MemoryMaintenance>,
    pub dispatcher: Arc<RecordingDispatcher>,
}

impl TestHarness {
    pub(crate) fn new() -> Self {
        let vendor = Arc::new(FakeVendor::default());
        let directory = Arc::new(FakeDirectory::default());
        let preferences = Arc::new(MemoryPreferences::default());
        let maintenance = Arc::new(MemoryMaintenance::default());
        let dispatcher = Arc::new(RecordingDispatcher::default());
        let state = AppState {
            config: runtime_config(),
            vendor: vendor.clone(),
            user_directory: directory.clone(),
            preference_repo: preferences.clone(),
            maintenance_repo: maintenance.clone(),
            report_dispatcher: dispatcher.clone(),
            health: Arc::new(AlwaysHealthy),
            access_policies: Arc::new(RwLock::new(Vec::new())),
            metrics: Arc::new(Metrics::default()),
        };
        Self {
            state,
            vendor,
            directory,
            preferences,
            maintenance,
            dispatcher,
        }
    }

    pub(crate) fn with_user(self, user: UserProfile) -> Self {
        *self.directory.user.lock().expect("directory lock") = Some(user);
        self
    }

    pub(crate) fn anonymous(&self) -> UserContext {
        UserContext::anonymous(self.state.config.default_offset())
    }

    pub(crate) async fn signed_in(&self) -> UserContext {
        resolve_user_context(&self.state, Some("session"), None)
            .await
            .expect("signed in context")
    }
}

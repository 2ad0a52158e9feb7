use std::env;
use std::path::Path;

use anyhow::{anyhow, Result};
use serde::Deserialize;
use tokio::fs;
use tracing::warn;

use backend_domain::{PlatformConfig, PreferenceStore, RuntimeConfig, VendorConfig};

use crate::config::validation::{validate_base_url, validate_positive};

const MAX_UTC_OFFSET_MINUTES: i32 = 14 * 60;
const MAX_SCAN_WINDOW_DAYS: i64 = 366;
const MAX_FORECAST_HORIZON_DAYS: f64 = 3_650.0;

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AppConfig {
    pub bind_addr: String,
    pub api_token: Option<String>,
    pub max_body_bytes: u64,
    pub request_timeout_seconds: u64,
    pub log_dir: Option<String>,
    pub vendor_base_url: String,
    #[serde(skip)]
    pub vendor_api_key: Option<String>,
    pub vendor_timeout_seconds: u64,
    pub platform_base_url: String,
    pub platform_app_id: String,
    #[serde(skip)]
    pub platform_service_token: Option<String>,
    pub platform_preferences_entity: String,
    pub platform_maintenance_entity: String,
    pub platform_report_function: String,
    pub platform_timeout_seconds: u64,
    pub refill_threshold_litres: f64,
    pub litres_per_wash: f64,
    pub scan_window_days: i64,
    pub forecast_horizon_days: f64,
    pub dispatch_enabled: bool,
    pub dispatch_interval_minutes: u64,
    pub default_utc_offset_minutes: i32,
    pub user_info_max_retries: u32,
    pub user_info_backoff_ms: u64,
    pub access_policies_path: Option<String>,
    pub preference_store: String,
    pub preferences_path: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:3240".to_string(),
            api_token: None,
            max_body_bytes: 1024 * 1024,
            request_timeout_seconds: 30,
            log_dir: None,
            vendor_base_url: "https://www.elora.com.au/api".to_string(),
            vendor_api_key: None,
            vendor_timeout_seconds: 20,
            platform_base_url: "https://app.base44.com/api".to_string(),
            platform_app_id: String::new(),
            platform_service_token: None,
            platform_preferences_entity: "EmailReportPreferences".to_string(),
            platform_maintenance_entity: "Maintenance".to_string(),
            platform_report_function: "sendEmailReport".to_string(),
            platform_timeout_seconds: 30,
            refill_threshold_litres: 200.0,
            litres_per_wash: 5.0,
            scan_window_days: 30,
            forecast_horizon_days: 365.0,
            dispatch_enabled: true,
            dispatch_interval_minutes: 15,
            default_utc_offset_minutes: 0,
            user_info_max_retries: 3,
            user_info_backoff_ms: 1_000,
            access_policies_path: Some("./access_policies.yaml".to_string()),
            preference_store: "platform".to_string(),
            preferences_path: "./email_report_preferences.json".to_string(),
        }
    }
}

impl AppConfig {
    pub async fn load() -> Result<Self> {
        let path = env::var("FLEETWASH_CONFIG").unwrap_or_else(|_| "./config.toml".to_string());
        let file_path = Path::new(&path);
        let base_dir = file_path.parent();
        let mut config = if file_path.exists() {
            let content = fs::read_to_string(file_path).await?;
            toml::from_str(&content)?
        } else {
            warn!("{} not found, using defaults", path);
            AppConfig::default()
        };
        config.apply_env_overrides();
        config.resolve_paths(base_dir);
        config.normalize();
        config.validate()?;
        Ok(config)
    }

    pub fn normalize(&mut self) {
        self.api_token = non_blank(self.api_token.take());
        self.log_dir = non_blank(self.log_dir.take());
        self.vendor_api_key = non_blank(self.vendor_api_key.take());
        self.platform_service_token = non_blank(self.platform_service_token.take());
        self.access_policies_path = non_blank(self.access_policies_path.take());
        self.vendor_base_url = self.vendor_base_url.trim().trim_end_matches('/').to_string();
        self.platform_base_url = self.platform_base_url.trim().trim_end_matches('/').to_string();
        self.platform_app_id = self.platform_app_id.trim().to_string();
        self.preference_store = self.preference_store.trim().to_lowercase();
    }

    fn resolve_paths(&mut self, base_dir: Option<&Path>) {
        let Some(base) = base_dir else {
            return;
        };
        self.preferences_path = resolve_path(base, &self.preferences_path);
        if let Some(path) = &self.access_policies_path {
            self.access_policies_path = Some(resolve_path(base, path));
        }
        if let Some(dir) = &self.log_dir {
            self.log_dir = Some(resolve_path(base, dir));
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.bind_addr
            .parse::<std::net::SocketAddr>()
            .map_err(|err| anyhow!("invalid bind_addr: {}", err))?;
        if self.max_body_bytes == 0 {
            return Err(anyhow!("max_body_bytes must be greater than 0"));
        }
        validate_base_url("vendor_base_url", &self.vendor_base_url)?;
        validate_base_url("platform_base_url", &self.platform_base_url)?;
        validate_positive("refill_threshold_litres", self.refill_threshold_litres)?;
        validate_positive("litres_per_wash", self.litres_per_wash)?;
        validate_positive("forecast_horizon_days", self.forecast_horizon_days)?;
        if self.forecast_horizon_days > MAX_FORECAST_HORIZON_DAYS {
            return Err(anyhow!(
                "forecast_horizon_days must be at most {}",
                MAX_FORECAST_HORIZON_DAYS
            ));
        }
        if self.scan_window_days <= 0 || self.scan_window_days > MAX_SCAN_WINDOW_DAYS {
            return Err(anyhow!(
                "scan_window_days must be between 1 and {}",
                MAX_SCAN_WINDOW_DAYS
            ));
        }
        if self.dispatch_interval_minutes == 0 {
            return Err(anyhow!("dispatch_interval_minutes must be greater than 0"));
        }
        if self.default_utc_offset_minutes.abs() > MAX_UTC_OFFSET_MINUTES {
            return Err(anyhow!(
                "default_utc_offset_minutes must be within +/-{}",
                MAX_UTC_OFFSET_MINUTES
            ));
        }
        let store = self.preference_store()?;
        if store == PreferenceStore::Platform && self.platform_app_id.is_empty() {
            return Err(anyhow!("platform_app_id is required for the platform preference store"));
        }
        Ok(())
    }

    pub fn preference_store(&self) -> Result<PreferenceStore> {
        match self.preference_store.as_str() {
            "platform" => Ok(PreferenceStore::Platform),
            "file" => Ok(PreferenceStore::File),
            other => Err(anyhow!("unknown preference_store '{}'", other)),
        }
    }

    pub fn to_runtime_config(&self) -> Result<RuntimeConfig> {
        Ok(RuntimeConfig {
            bind_addr: self.bind_addr.clone(),
            api_token: self.api_token.clone(),
            max_body_bytes: self.max_body_bytes,
            request_timeout_seconds: self.request_timeout_seconds,
            refill_threshold_litres: self.refill_threshold_litres,
            litres_per_wash: self.litres_per_wash,
            scan_window_days: self.scan_window_days,
            forecast_horizon_days: self.forecast_horizon_days,
            dispatch_enabled: self.dispatch_enabled,
            dispatch_interval_minutes: self.dispatch_interval_minutes,
            default_utc_offset_minutes: self.default_utc_offset_minutes,
            user_info_max_retries: self.user_info_max_retries,
            user_info_backoff_ms: self.user_info_backoff_ms,
            access_policies_path: self.access_policies_path.clone(),
            preference_store: self.preference_store()?,
            preferences_path: self.preferences_path.clone(),
        })
    }

    pub fn to_vendor_config(&self) -> VendorConfig {
        VendorConfig {
            base_url: self.vendor_base_url.clone(),
            api_key: self.vendor_api_key.clone(),
            timeout_seconds: self.vendor_timeout_seconds,
        }
    }

    pub fn to_platform_config(&self) -> PlatformConfig {
        PlatformConfig {
            base_url: self.platform_base_url.clone(),
            app_id: self.platform_app_id.clone(),
            service_token: self.platform_service_token.clone(),
            preferences_entity: self.platform_preferences_entity.clone(),
            maintenance_entity: self.platform_maintenance_entity.clone(),
            report_function: self.platform_report_function.clone(),
            timeout_seconds: self.platform_timeout_seconds,
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(value) = env::var("FLEETWASH_BIND_ADDR") {
            self.bind_addr = value;
        }
        if let Ok(value) = env::var("FLEETWASH_API_TOKEN") {
            self.api_token = Some(value);
        }
        if let Ok(value) = env::var("FLEETWASH_LOG_DIR") {
            self.log_dir = Some(value);
        }
        if let Ok(value) = env::var("ELORA_API_KEY") {
            self.vendor_api_key = Some(value);
        }
        if let Ok(value) = env::var("FLEETWASH_VENDOR_BASE_URL") {
            self.vendor_base_url = value;
        }
        if let Ok(value) = env::var("FLEETWASH_PLATFORM_BASE_URL") {
            self.platform_base_url = value;
        }
        if let Ok(value) = env::var("FLEETWASH_PLATFORM_APP_ID") {
            self.platform_app_id = value;
        }
        if let Ok(value) = env::var("FLEETWASH_PLATFORM_TOKEN") {
            self.platform_service_token = Some(value);
        }
        if let Ok(value) = env::var("FLEETWASH_REFILL_THRESHOLD_LITRES") {
            self.refill_threshold_litres = value.parse().unwrap_or(self.refill_threshold_litres);
        }
        if let Ok(value) = env::var("FLEETWASH_DISPATCH_ENABLED") {
            self.dispatch_enabled = value.parse().unwrap_or(self.dispatch_enabled);
        }
        if let Ok(value) = env::var("FLEETWASH_DISPATCH_INTERVAL_MINUTES") {
            self.dispatch_interval_minutes =
                value.parse().unwrap_or(self.dispatch_interval_minutes);
        }
        if let Ok(value) = env::var("FLEETWASH_DEFAULT_UTC_OFFSET_MINUTES") {
            self.default_utc_offset_minutes =
                value.parse().unwrap_or(self.default_utc_offset_minutes);
        }
        if let Ok(value) = env::var("FLEETWASH_ACCESS_POLICIES_PATH") {
            self.access_policies_path = Some(value);
        }
        if let Ok(value) = env::var("FLEETWASH_PREFERENCE_STORE") {
            self.preference_store = value;
        }
        if let Ok(value) = env::var("FLEETWASH_PREFERENCES_PATH") {
            self.preferences_path = value;
        }
        if let Ok(value) = env::var("FLEETWASH_MAX_BODY_BYTES") {
            self.max_body_bytes = value.parse().unwrap_or(self.max_body_bytes);
        }
        if let Ok(value) = env::var("FLEETWASH_REQUEST_TIMEOUT_SECONDS") {
            self.request_timeout_seconds = value.parse().unwrap_or(self.request_timeout_seconds);
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|item| !item.trim().is_empty())
}

fn resolve_path(base: &Path, value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return trimmed.to_string();
    }
    let path = Path::new(trimmed);
    if path.is_absolute() {
        trimmed.to_string()
    } else {
        base.join(path).to_string_lossy().to_string()
    }
}

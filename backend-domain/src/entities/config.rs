use chrono::{FixedOffset, Offset, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreferenceStore {
    Platform,
    File,
}

#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub bind_addr: String,
    pub api_token: Option<String>,
    pub max_body_bytes: u64,
    pub request_timeout_seconds: u64,
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
    pub preference_store: PreferenceStore,
    pub preferences_path: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:3240".to_string(),
            api_token: None,
            max_body_bytes: 1024 * 1024,
            request_timeout_seconds: 30,
            refill_threshold_litres: 200.0,
            litres_per_wash: 5.0,
            scan_window_days: 30,
            forecast_horizon_days: 365.0,
            dispatch_enabled: true,
            dispatch_interval_minutes: 15,
            default_utc_offset_minutes: 0,
            user_info_max_retries: 3,
            user_info_backoff_ms: 1000,
            access_policies_path: None,
            preference_store: PreferenceStore::Platform,
            preferences_path: "./email_report_preferences.json".to_string(),
        }
    }
}

impl RuntimeConfig {
    pub fn default_offset(&self) -> FixedOffset {
        offset_from_minutes(self.default_utc_offset_minutes)
    }
}

/// Out-of-range offsets fall back to UTC.
pub fn offset_from_minutes(minutes: i32) -> FixedOffset {
    minutes
        .checked_mul(60)
        .and_then(FixedOffset::east_opt)
        .unwrap_or_else(|| Utc.fix())
}

#[derive(Debug, Clone)]
pub struct VendorConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone)]
pub struct PlatformConfig {
    pub base_url: String,
    pub app_id: String,
    pub service_token: Option<String>,
    pub preferences_entity: String,
    pub maintenance_entity: String,
    pub report_function: String,
    pub timeout_seconds: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offsets_outside_a_day_fall_back_to_utc() {
        assert_eq!(offset_from_minutes(600).local_minus_utc(), 36_000);
        assert_eq!(offset_from_minutes(-300).local_minus_utc(), -18_000);
        assert_eq!(offset_from_minutes(2_000).local_minus_utc(), 0);
    }
}

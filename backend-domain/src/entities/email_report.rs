// Email report preference entity
// One record per user, keyed by email

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::utils::{
    deserialize_lenient_string, deserialize_optional_string, deserialize_optional_timestamp,
    deserialize_optional_u32, deserialize_string_list, deserialize_true_unless_false,
    deserialize_truthy,
};
use crate::value_objects::ReportFrequency;

pub const DEFAULT_TIME_OF_DAY: &str = "09:00";
pub const DEFAULT_DAY_OF_WEEK: u32 = 1;
pub const DEFAULT_DAY_OF_MONTH: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmailReportPreference {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "deserialize_lenient_string")]
    pub user_email: String,
    #[serde(default, deserialize_with = "deserialize_truthy")]
    pub enabled: bool,
    #[serde(default, deserialize_with = "ReportFrequency::deserialize_stored")]
    pub frequency: ReportFrequency,
    #[serde(default, deserialize_with = "deserialize_string_list")]
    pub report_types: Vec<String>,
    #[serde(default = "default_true", deserialize_with = "deserialize_true_unless_false")]
    pub include_charts: bool,
    #[serde(default = "default_true", deserialize_with = "deserialize_true_unless_false")]
    pub include_ai_insights: bool,
    #[serde(default = "default_time_of_day", deserialize_with = "time_of_day_or_default")]
    pub time_of_day: String,
    #[serde(default = "default_day_of_week", deserialize_with = "day_of_week_or_default")]
    pub day_of_week: u32,
    #[serde(default = "default_day_of_month", deserialize_with = "day_of_month_or_default")]
    pub day_of_month: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub utc_offset_minutes: Option<i32>,
    #[serde(default, deserialize_with = "deserialize_optional_timestamp")]
    pub last_sent: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "deserialize_optional_timestamp")]
    pub next_scheduled: Option<DateTime<Utc>>,
}

impl EmailReportPreference {
    /// Preferences shown to a user who has never saved any.
    pub fn defaults_for(user_email: &str) -> Self {
        Self {
            id: None,
            user_email: user_email.to_string(),
            enabled: false,
            frequency: ReportFrequency::Weekly,
            report_types: Vec::new(),
            include_charts: true,
            include_ai_insights: true,
            time_of_day: DEFAULT_TIME_OF_DAY.to_string(),
            day_of_week: DEFAULT_DAY_OF_WEEK,
            day_of_month: DEFAULT_DAY_OF_MONTH,
            utc_offset_minutes: None,
            last_sent: None,
            next_scheduled: None,
        }
    }

    pub fn to_report_request(&self) -> ReportRequest {
        ReportRequest {
            user_email: self.user_email.clone(),
            report_types: self.report_types.clone(),
            include_charts: self.include_charts,
            include_ai_insights: self.include_ai_insights,
        }
    }
}

/// Payload the settings screen submits.
#[derive(Debug, Clone, Deserialize)]
pub struct EmailReportPreferenceUpdate {
    pub enabled: bool,
    pub frequency: String,
    #[serde(default)]
    pub report_types: Vec<String>,
    #[serde(default = "default_true")]
    pub include_charts: bool,
    #[serde(default = "default_true")]
    pub include_ai_insights: bool,
    #[serde(default = "default_time_of_day")]
    pub time_of_day: String,
    #[serde(default = "default_day_of_week")]
    pub day_of_week: u32,
    #[serde(default = "default_day_of_month")]
    pub day_of_month: u32,
}

/// Arguments of the `sendEmailReport` function.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRequest {
    pub user_email: String,
    pub report_types: Vec<String>,
    pub include_charts: bool,
    pub include_ai_insights: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DispatchFailure {
    pub email: String,
    pub error: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DispatchResults {
    pub total: usize,
    pub sent: usize,
    pub skipped: usize,
    pub failed: usize,
    pub errors: Vec<DispatchFailure>,
}

fn default_true() -> bool {
    true
}

fn default_time_of_day() -> String {
    DEFAULT_TIME_OF_DAY.to_string()
}

fn default_day_of_week() -> u32 {
    DEFAULT_DAY_OF_WEEK
}

fn default_day_of_month() -> u32 {
    DEFAULT_DAY_OF_MONTH
}

fn time_of_day_or_default<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(deserialize_optional_string(deserializer)?.unwrap_or_else(default_time_of_day))
}

fn day_of_week_or_default<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    Ok(deserialize_optional_u32(deserializer)?.unwrap_or(DEFAULT_DAY_OF_WEEK))
}

fn day_of_month_or_default<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    Ok(deserialize_optional_u32(deserializer)?.unwrap_or(DEFAULT_DAY_OF_MONTH))
}

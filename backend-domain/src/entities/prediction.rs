// Refill prediction entities
// Derived on every analysis run, never persisted

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::{ConsumptionTrend, DataQuality, UrgencyTier};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SitePrediction {
    pub site: String,
    pub customer: String,
    pub current_stock: f64,
    pub daily_consumption: f64,
    pub trend: ConsumptionTrend,
    pub days_until_refill: f64,
    pub predicted_refill_date: NaiveDate,
    pub urgency: UrgencyTier,
    pub confidence: u8,
    pub avg_refill_interval_days: Option<f64>,
    pub avg_refill_volume: f64,
    pub total_washes: usize,
    pub total_cost: f64,
    pub cost_per_wash: f64,
    pub data_quality: DataQuality,
    pub valid_consumption_pairs: usize,
    pub refill_count: usize,
    /// Washes over the whole scan history per recorded refill, rounded.
    pub avg_washes_per_refill: f64,
    pub last_refill_date: DateTime<Utc>,
}

/// Sites predicted to need a refill in the same calendar week.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleGroup {
    pub week_of: NaiveDate,
    pub sites: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostEfficiencyEntry {
    pub site: String,
    pub cost_per_wash: f64,
    pub total_washes: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefillAnalysis {
    pub generated_at: DateTime<Utc>,
    pub predictions: Vec<SitePrediction>,
    pub schedule_groups: Vec<ScheduleGroup>,
    pub cost_efficiency: Vec<CostEfficiencyEntry>,
    pub total_sites: usize,
    pub critical_sites: usize,
    pub warning_sites: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteWashCount {
    pub site: String,
    pub washes: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComplianceRating {
    Good,
    Warning,
    Critical,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplianceSummary {
    pub total_vehicles: usize,
    pub compliant_vehicles: usize,
    pub non_compliant_vehicles: usize,
    pub compliance_rate: u32,
    pub rating: ComplianceRating,
    pub total_washes: f64,
    pub washes_by_site: Vec<SiteWashCount>,
}

// Consumption trend and data quality value objects

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConsumptionTrend {
    Increasing,
    Decreasing,
    Stable,
}

impl ConsumptionTrend {
    pub fn multiplier(&self) -> f64 {
        match self {
            ConsumptionTrend::Increasing => 1.1,
            ConsumptionTrend::Decreasing => 0.9,
            ConsumptionTrend::Stable => 1.0,
        }
    }

    pub fn is_stable(&self) -> bool {
        matches!(self, ConsumptionTrend::Stable)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ConsumptionTrend::Increasing => "increasing",
            ConsumptionTrend::Decreasing => "decreasing",
            ConsumptionTrend::Stable => "stable",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataQuality {
    Excellent,
    Good,
    Fair,
    Limited,
}

impl DataQuality {
    pub fn from_valid_pairs(count: usize) -> Self {
        match count {
            n if n >= 5 => DataQuality::Excellent,
            n if n >= 3 => DataQuality::Good,
            n if n >= 1 => DataQuality::Fair,
            _ => DataQuality::Limited,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DataQuality::Excellent => "excellent",
            DataQuality::Good => "good",
            DataQuality::Fair => "fair",
            DataQuality::Limited => "limited",
        }
    }
}

// Report frequency and report type value objects

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ReportFrequency {
    Daily,
    #[default]
    Weekly,
    Monthly,
    /// A stored value none of the above; never due.
    Unrecognised,
}

impl ReportFrequency {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "daily" => Some(ReportFrequency::Daily),
            "weekly" => Some(ReportFrequency::Weekly),
            "monthly" => Some(ReportFrequency::Monthly),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ReportFrequency::Daily => "daily",
            ReportFrequency::Weekly => "weekly",
            ReportFrequency::Monthly => "monthly",
            ReportFrequency::Unrecognised => "unrecognised",
        }
    }

    /// Minimum gap since the last send before the dispatcher sends again
    /// (23 hours, 6.5 days, 29 days).
    pub fn min_hours_between_sends(&self) -> Option<f64> {
        match self {
            ReportFrequency::Daily => Some(23.0),
            ReportFrequency::Weekly => Some(156.0),
            ReportFrequency::Monthly => Some(696.0),
            ReportFrequency::Unrecognised => None,
        }
    }

    /// Stored rows: null means the default, any other unknown value is `Unrecognised`.
    pub fn deserialize_stored<'de, D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Option::<Value>::deserialize(deserializer)? {
            None => ReportFrequency::default(),
            Some(Value::String(text)) => {
                ReportFrequency::parse(&text).unwrap_or(ReportFrequency::Unrecognised)
            }
            Some(_) => ReportFrequency::Unrecognised,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReportType {
    Compliance,
    Maintenance,
    Costs,
    Refills,
    AiInsights,
}

impl ReportType {
    pub const ALL: [ReportType; 5] = [
        ReportType::Compliance,
        ReportType::Maintenance,
        ReportType::Costs,
        ReportType::Refills,
        ReportType::AiInsights,
    ];

    pub fn from_id(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "compliance" => Some(ReportType::Compliance),
            "maintenance" => Some(ReportType::Maintenance),
            "costs" => Some(ReportType::Costs),
            "refills" => Some(ReportType::Refills),
            "ai_insights" => Some(ReportType::AiInsights),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ReportType::Compliance => "compliance",
            ReportType::Maintenance => "maintenance",
            ReportType::Costs => "costs",
            ReportType::Refills => "refills",
            ReportType::AiInsights => "ai_insights",
        }
    }
}

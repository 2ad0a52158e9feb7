// Maintenance entities
// Service records are stored on the platform; summaries are derived per request

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::utils::{
    deserialize_lenient_string, deserialize_optional_f64, deserialize_optional_string,
    deserialize_optional_timestamp,
};

/// One service performed on a vehicle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaintenanceRecord {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_optional_string"
    )]
    pub id: Option<String>,
    #[serde(default, alias = "vehicleId", deserialize_with = "deserialize_lenient_string")]
    pub vehicle_id: String,
    #[serde(default, alias = "serviceType", deserialize_with = "deserialize_lenient_string")]
    pub service_type: String,
    #[serde(
        default,
        alias = "serviceDate",
        deserialize_with = "deserialize_optional_timestamp"
    )]
    pub service_date: Option<DateTime<Utc>>,
    #[serde(
        default,
        alias = "nextServiceDate",
        deserialize_with = "deserialize_optional_timestamp"
    )]
    pub next_service_date: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "deserialize_optional_f64")]
    pub cost: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub notes: Option<String>,
}

/// Body of a create request. The platform assigns the id.
#[derive(Debug, Clone, Deserialize)]
pub struct NewMaintenanceRecord {
    pub vehicle_id: String,
    pub service_type: String,
    pub service_date: DateTime<Utc>,
    #[serde(default)]
    pub next_service_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub cost: Option<f64>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl NewMaintenanceRecord {
    pub fn into_record(self) -> MaintenanceRecord {
        MaintenanceRecord {
            id: None,
            vehicle_id: self.vehicle_id.trim().to_string(),
            service_type: self.service_type.trim().to_lowercase(),
            service_date: Some(self.service_date),
            next_service_date: self.next_service_date,
            cost: self.cost,
            notes: self.notes.filter(|notes| !notes.trim().is_empty()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyCost {
    /// `YYYY-MM`
    pub month: String,
    pub cost: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceTypeCount {
    pub service_type: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaintenanceSummary {
    pub record_count: usize,
    pub total_cost: f64,
    /// Total cost over every record, costed or not.
    pub average_cost: f64,
    /// Last twelve months with costed services, oldest first.
    pub monthly_costs: Vec<MonthlyCost>,
    pub service_types: Vec<ServiceTypeCount>,
    /// Next service within thirty days, soonest first.
    pub upcoming: Vec<MaintenanceRecord>,
    pub overdue: Vec<MaintenanceRecord>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UrgentItemKind {
    MaintenanceOverdue,
    BelowTarget,
    DevicesOffline,
    MaintenanceUpcoming,
}

/// A dashboard call to action with the identifiers behind its count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UrgentItem {
    pub kind: UrgentItemKind,
    pub count: usize,
    pub ids: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn platform_rows_decode_with_missing_fields() {
        let record: MaintenanceRecord = serde_json::from_value(serde_json::json!({
            "id": "m-1",
            "vehicle_id": 42,
            "service_type": "oil_change",
            "service_date": "2024-05-01",
            "next_service_date": null,
            "cost": "180.50"
        }))
        .expect("decode");
        assert_eq!(record.vehicle_id, "42");
        assert_eq!(record.cost, Some(180.5));
        assert!(record.service_date.is_some());
        assert!(record.next_service_date.is_none());
        assert!(record.notes.is_none());
    }

    #[test]
    fn new_records_are_normalized() {
        let record = NewMaintenanceRecord {
            vehicle_id: " V-1 ".to_string(),
            service_type: "Tyre_Rotation".to_string(),
            service_date: Utc::now(),
            next_service_date: None,
            cost: Some(90.0),
            notes: Some("  ".to_string()),
        }
        .into_record();
        assert!(record.id.is_none());
        assert_eq!(record.vehicle_id, "V-1");
        assert_eq!(record.service_type, "tyre_rotation");
        assert!(record.notes.is_none());
        let body = serde_json::to_value(&record).expect("encode");
        assert!(body.get("id").is_none());
    }
}

// Fleet entities served by the vendor API

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::utils::{
    deserialize_lenient_f64, deserialize_lenient_string, deserialize_optional_timestamp,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    #[serde(
        default,
        alias = "ref",
        alias = "customerRef",
        deserialize_with = "deserialize_lenient_string"
    )]
    pub id: String,
    #[serde(default, alias = "customerName", deserialize_with = "deserialize_lenient_string")]
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Site {
    #[serde(
        default,
        alias = "ref",
        alias = "siteRef",
        deserialize_with = "deserialize_lenient_string"
    )]
    pub id: String,
    #[serde(default, alias = "siteName", deserialize_with = "deserialize_lenient_string")]
    pub name: String,
    #[serde(default, alias = "customerRef", deserialize_with = "deserialize_lenient_string")]
    pub customer_ref: String,
    #[serde(default, alias = "customerName", deserialize_with = "deserialize_lenient_string")]
    pub customer_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
    #[serde(
        default,
        alias = "ref",
        alias = "vehicleRef",
        deserialize_with = "deserialize_lenient_string"
    )]
    pub id: String,
    #[serde(
        default,
        alias = "vehicleName",
        alias = "rego",
        deserialize_with = "deserialize_lenient_string"
    )]
    pub name: String,
    #[serde(
        default,
        alias = "siteId",
        alias = "siteRef",
        deserialize_with = "deserialize_lenient_string"
    )]
    pub site_id: String,
    #[serde(default, alias = "customerName", deserialize_with = "deserialize_lenient_string")]
    pub customer_name: String,
    #[serde(
        default,
        alias = "washesCompleted",
        deserialize_with = "deserialize_lenient_f64"
    )]
    pub washes_completed: f64,
    #[serde(default, alias = "washTarget", deserialize_with = "deserialize_lenient_f64")]
    pub target: f64,
}

impl Vehicle {
    pub fn is_compliant(&self) -> bool {
        self.washes_completed >= self.target
    }

    /// Fewer washes than `ratio` of the target.
    pub fn is_below(&self, ratio: f64) -> bool {
        self.washes_completed < self.target * ratio
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Device {
    #[serde(
        default,
        alias = "ref",
        alias = "deviceRef",
        deserialize_with = "deserialize_lenient_string"
    )]
    pub id: String,
    #[serde(default, deserialize_with = "deserialize_lenient_string")]
    pub status: String,
    #[serde(default, alias = "siteName", deserialize_with = "deserialize_lenient_string")]
    pub site_name: String,
    #[serde(
        default,
        alias = "lastScanAt",
        deserialize_with = "deserialize_optional_timestamp"
    )]
    pub last_scan_at: Option<DateTime<Utc>>,
}

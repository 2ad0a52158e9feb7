// Refill entity
// A delivery of wash chemical to a site's tank, as recorded by the vendor

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::utils::{
    deserialize_lenient_f64, deserialize_lenient_string, deserialize_optional_f64,
    deserialize_timestamp,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefillEvent {
    #[serde(default, deserialize_with = "deserialize_lenient_string")]
    pub site: String,
    #[serde(default, deserialize_with = "deserialize_lenient_string")]
    pub customer: String,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub date: DateTime<Utc>,
    #[serde(default, deserialize_with = "deserialize_lenient_f64")]
    pub delivered_litres: f64,
    #[serde(default, deserialize_with = "deserialize_optional_f64")]
    pub start_litres: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_lenient_f64")]
    pub new_total_litres: f64,
    #[serde(default, deserialize_with = "deserialize_lenient_f64")]
    pub total_ex_gst: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_name: Option<String>,
}

impl RefillEvent {
    /// Tank level before the delivery. Derived from the resulting level when
    /// the vendor omits the reading.
    pub fn starting_level(&self) -> f64 {
        self.start_litres
            .unwrap_or(self.new_total_litres - self.delivered_litres)
    }

    /// Tank level after the delivery.
    pub fn resulting_level(&self) -> f64 {
        self.new_total_litres
    }
}

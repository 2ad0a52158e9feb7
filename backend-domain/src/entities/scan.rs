// Scan entity
// One recorded vehicle wash at a site

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::utils::{deserialize_lenient_string, deserialize_timestamp};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanEvent {
    #[serde(
        default,
        alias = "vehicleRef",
        alias = "vehicle",
        deserialize_with = "deserialize_lenient_string"
    )]
    pub vehicle_ref: String,
    #[serde(
        default,
        alias = "siteRef",
        alias = "site",
        deserialize_with = "deserialize_lenient_string"
    )]
    pub site_ref: String,
    #[serde(default, alias = "siteName", deserialize_with = "deserialize_lenient_string")]
    pub site_name: String,
    #[serde(alias = "createdAt", deserialize_with = "deserialize_timestamp")]
    pub timestamp: DateTime<Utc>,
}

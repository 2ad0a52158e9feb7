// HTTP clients for the vendor API and the low-code platform

pub mod elora;
pub mod platform;

pub use elora::EloraClient;
pub use platform::PlatformClient;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::warn;

/// Vendor and platform list endpoints answer with a bare array, `{data: [...]}`
/// or `{body: [...]}`. Anything else is treated as an empty list.
pub fn unwrap_records(endpoint: &str, payload: Value) -> Vec<Value> {
    match payload {
        Value::Array(items) => items,
        Value::Object(mut map) => {
            for key in ["data", "body"] {
                if let Some(Value::Array(items)) = map.remove(key) {
                    return items;
                }
            }
            warn!("unexpected {} response shape, keys: {:?}", endpoint, map.keys().collect::<Vec<_>>());
            Vec::new()
        }
        other => {
            warn!("unexpected {} response: {}", endpoint, other);
            Vec::new()
        }
    }
}

/// Decodes each record on its own so one malformed row does not drop the page.
pub fn decode_records<T: DeserializeOwned>(endpoint: &str, records: Vec<Value>) -> Vec<T> {
    let total = records.len();
    let decoded: Vec<T> = records
        .into_iter()
        .filter_map(|record| match serde_json::from_value(record) {
            Ok(item) => Some(item),
            Err(err) => {
                warn!("skipping malformed {} record: {}", endpoint, err);
                None
            }
        })
        .collect();
    if decoded.len() < total {
        warn!("{} of {} {} records skipped", total - decoded.len(), total, endpoint);
    }
    decoded
}

use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, error};

use backend_domain::ports::VendorApi;
use backend_domain::{
    Customer, Device, RefillEvent, ScanEvent, Site, Vehicle, VendorConfig, VendorError, VendorFilter,
};

use super::{decode_records, unwrap_records};

pub const API_KEY_HEADER: &str = "X-API-Key";
const DEFAULT_DEVICE_STATUS: &str = "active";

type Params = Vec<(&'static str, String)>;

pub struct EloraClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl EloraClient {
    pub fn new(config: &VendorConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds.max(3)))
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &Params,
    ) -> Result<Vec<T>, VendorError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| VendorError::transport("vendor API key not configured"))?;
        let url = format!("{}/{}", self.base_url, endpoint);
        debug!("GET {} {:?}", url, params);

        let response = self
            .client
            .get(&url)
            .header(API_KEY_HEADER, api_key)
            .query(params)
            .send()
            .await
            .map_err(|err| VendorError::transport(format!("{endpoint}: {err}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("vendor {} responded {}: {}", endpoint, status, body);
            return Err(VendorError::status(status.as_u16(), body));
        }

        let payload: Value = response.json().await.map_err(|err| VendorError {
            status: Some(status.as_u16()),
            message: format!("{endpoint}: invalid JSON: {err}"),
            body: None,
        })?;
        Ok(decode_records(endpoint, unwrap_records(endpoint, payload)))
    }
}

fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

fn push_scope(params: &mut Params, keys: [&'static str; 4], filter: &VendorFilter) {
    let [customer, site, from, to] = keys;
    if let Some(value) = &filter.customer {
        params.push((customer, value.clone()));
    }
    if let Some(value) = &filter.site {
        params.push((site, value.clone()));
    }
    if let Some(date) = filter.from_date {
        params.push((from, format_date(date)));
    }
    if let Some(date) = filter.to_date {
        params.push((to, format_date(date)));
    }
}

pub fn scan_params(filter: &VendorFilter) -> Params {
    let mut params = vec![("export", "all".to_string()), ("status", "success".to_string())];
    push_scope(&mut params, ["customer", "site", "fromDate", "toDate"], filter);
    params
}

pub fn refill_params(filter: &VendorFilter) -> Params {
    let mut params = Vec::new();
    push_scope(&mut params, ["customer", "site", "fromDate", "toDate"], filter);
    params
}

pub fn vehicle_params(filter: &VendorFilter) -> Params {
    let mut params = Vec::new();
    push_scope(
        &mut params,
        ["customer_id", "site_id", "start_date", "end_date"],
        filter,
    );
    params
}

pub fn site_params(customer: Option<&str>) -> Params {
    let filter = VendorFilter::customer(customer.map(ToString::to_string));
    filter
        .customer
        .map(|customer| vec![("customer_id", customer)])
        .unwrap_or_default()
}

pub fn device_params(status: Option<&str>) -> Params {
    let status = status
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .unwrap_or(DEFAULT_DEVICE_STATUS);
    vec![("status", status.to_string())]
}

#[async_trait]
impl VendorApi for EloraClient {
    async fn list_customers(&self) -> Result<Vec<Customer>, VendorError> {
        self.fetch("customers", &Vec::new()).await
    }

    async fn list_sites(&self, customer: Option<&str>) -> Result<Vec<Site>, VendorError> {
        self.fetch("sites", &site_params(customer)).await
    }

    async fn list_vehicles(&self, filter: &VendorFilter) -> Result<Vec<Vehicle>, VendorError> {
        self.fetch("vehicles", &vehicle_params(filter)).await
    }

    async fn list_scans(&self, filter: &VendorFilter) -> Result<Vec<ScanEvent>, VendorError> {
        self.fetch("scans", &scan_params(filter)).await
    }

    async fn list_refills(&self, filter: &VendorFilter) -> Result<Vec<RefillEvent>, VendorError> {
        self.fetch("refills", &refill_params(filter)).await
    }

    async fn list_devices(&self, status: Option<&str>) -> Result<Vec<Device>, VendorError> {
        self.fetch("devices", &device_params(status)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(params: &Params) -> Vec<&str> {
        params.iter().map(|(key, _)| *key).collect()
    }

    #[test]
    fn scans_always_request_successful_export() {
        let filter = VendorFilter::new(
            Some("C-1".to_string()),
            Some("all".to_string()),
            NaiveDate::from_ymd_opt(2024, 5, 1),
            None,
        );
        let params = scan_params(&filter);
        assert_eq!(keys(&params), vec!["export", "status", "customer", "fromDate"]);
        assert_eq!(params[3].1, "2024-05-01");
    }

    #[test]
    fn vehicles_use_snake_case_names() {
        let filter = VendorFilter::new(
            Some("C-1".to_string()),
            Some("S-9".to_string()),
            NaiveDate::from_ymd_opt(2024, 5, 1),
            NaiveDate::from_ymd_opt(2024, 5, 31),
        );
        assert_eq!(
            keys(&vehicle_params(&filter)),
            vec!["customer_id", "site_id", "start_date", "end_date"]
        );
        assert_eq!(keys(&refill_params(&filter)), vec!["customer", "site", "fromDate", "toDate"]);
    }

    #[test]
    fn all_sentinel_never_reaches_query_string() {
        let filter = VendorFilter::new(Some("all".to_string()), Some("ALL".to_string()), None, None);
        assert!(refill_params(&filter).is_empty());
        assert!(vehicle_params(&filter).is_empty());
        assert!(site_params(Some("all")).is_empty());
        assert_eq!(site_params(Some("C-2")), vec![("customer_id", "C-2".to_string())]);
    }

    #[test]
    fn devices_default_to_active() {
        assert_eq!(device_params(None), vec![("status", "active".to_string())]);
        assert_eq!(device_params(Some("inactive")), vec![("status", "inactive".to_string())]);
    }

    #[tokio::test]
    async fn missing_key_is_a_vendor_error() {
        let client = EloraClient::new(&VendorConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            api_key: None,
            timeout_seconds: 3,
        })
        .expect("client");
        let err = client.list_customers().await.expect_err("no key");
        assert_eq!(err.status, None);
        assert!(err.message.contains("API key"));
    }
}

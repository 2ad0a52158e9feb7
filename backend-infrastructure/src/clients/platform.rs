use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, error};

use backend_domain::ports::{
    MaintenanceRepository, PreferenceRepository, ReportDispatcher, UserDirectory,
};
use backend_domain::{
    EmailReportPreference, MaintenanceRecord, PlatformConfig, PlatformError, ReportRequest,
    UserProfile,
};

use super::{decode_records, unwrap_records};

const MAINTENANCE_SORT: &str = "-service_date";
const MAINTENANCE_PAGE_SIZE: &str = "1000";

/// REST access to the low-code platform: current user, stored entities and
/// serverless functions.
pub struct PlatformClient {
    client: Client,
    config: PlatformConfig,
}

impl PlatformClient {
    pub fn new(config: &PlatformConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds.max(3)))
            .build()?;
        Ok(Self {
            client,
            config: config.clone(),
        })
    }

    pub fn app_url(&self, path: &str) -> String {
        format!(
            "{}/apps/{}/{}",
            self.config.base_url.trim_end_matches('/'),
            self.config.app_id,
            path.trim_start_matches('/')
        )
    }

    fn entity_url(&self, entity: &str, id: Option<&str>) -> String {
        match id {
            Some(id) => self.app_url(&format!("entities/{}/{}", entity, id)),
            None => self.app_url(&format!("entities/{}", entity)),
        }
    }

    fn service(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.config.service_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response, PlatformError> {
        let response = builder
            .send()
            .await
            .map_err(|err| PlatformError::Transport(err.to_string()))?;
        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(PlatformError::Unauthorized);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("platform responded {}: {}", status, body);
            return Err(PlatformError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    async fn json(response: Response) -> Result<Value, PlatformError> {
        response
            .json::<Value>()
            .await
            .map_err(|err| PlatformError::Decode(err.to_string()))
    }

    async fn fetch_preferences(
        &self,
        query: Option<Value>,
    ) -> Result<Vec<EmailReportPreference>, PlatformError> {
        let mut builder = self
            .client
            .get(self.entity_url(&self.config.preferences_entity, None));
        if let Some(query) = query {
            builder = builder.query(&[("q", query.to_string())]);
        }
        let payload = Self::json(self.send(self.service(builder)).await?).await?;
        Ok(decode_records(
            &self.config.preferences_entity,
            unwrap_records(&self.config.preferences_entity, payload),
        ))
    }
}

/// Stored form of an entity: no id, the platform assigns it.
fn stored_body<T: Serialize>(entity: &T) -> Result<Value, PlatformError> {
    let mut body =
        serde_json::to_value(entity).map_err(|err| PlatformError::Decode(err.to_string()))?;
    if let Value::Object(map) = &mut body {
        map.remove("id");
    }
    Ok(body)
}

fn decode_entity<T: DeserializeOwned>(payload: Value) -> Result<T, PlatformError> {
    serde_json::from_value(payload).map_err(|err| PlatformError::Decode(err.to_string()))
}

#[async_trait]
impl UserDirectory for PlatformClient {
    async fn current_user(&self, session_token: &str) -> Result<UserProfile, PlatformError> {
        let builder = self
            .client
            .get(self.app_url("entities/User/me"))
            .bearer_auth(session_token);
        let payload = Self::json(self.send(builder).await?).await?;
        serde_json::from_value(payload).map_err(|err| PlatformError::Decode(err.to_string()))
    }
}

#[async_trait]
impl PreferenceRepository for PlatformClient {
    async fn list(&self) -> Result<Vec<EmailReportPreference>, PlatformError> {
        self.fetch_preferences(None).await
    }

    async fn find_by_email(
        &self,
        email: &str,
    ) -> Result<Option<EmailReportPreference>, PlatformError> {
        let matches = self
            .fetch_preferences(Some(json!({ "user_email": email })))
            .await?;
        Ok(matches
            .into_iter()
            .find(|preference| preference.user_email.eq_ignore_ascii_case(email)))
    }

    async fn create(
        &self,
        preference: &EmailReportPreference,
    ) -> Result<EmailReportPreference, PlatformError> {
        let builder = self
            .client
            .post(self.entity_url(&self.config.preferences_entity, None))
            .json(&stored_body(preference)?);
        let payload = Self::json(self.send(self.service(builder)).await?).await?;
        debug!("created report preferences for {}", preference.user_email);
        decode_entity(payload)
    }

    async fn update(
        &self,
        preference: &EmailReportPreference,
    ) -> Result<EmailReportPreference, PlatformError> {
        let id = preference
            .id
            .as_deref()
            .ok_or_else(|| PlatformError::Storage("preference has no id".to_string()))?;
        let builder = self
            .client
            .put(self.entity_url(&self.config.preferences_entity, Some(id)))
            .json(&stored_body(preference)?);
        let payload = Self::json(self.send(self.service(builder)).await?).await?;
        decode_entity(payload)
    }
}

#[async_trait]
impl MaintenanceRepository for PlatformClient {
    async fn list_records(&self) -> Result<Vec<MaintenanceRecord>, PlatformError> {
        let entity = &self.config.maintenance_entity;
        let builder = self
            .client
            .get(self.entity_url(entity, None))
            .query(&[("sort", MAINTENANCE_SORT), ("limit", MAINTENANCE_PAGE_SIZE)]);
        let payload = Self::json(self.send(self.service(builder)).await?).await?;
        Ok(decode_records(entity, unwrap_records(entity, payload)))
    }

    async fn create_record(
        &self,
        record: &MaintenanceRecord,
    ) -> Result<MaintenanceRecord, PlatformError> {
        let builder = self
            .client
            .post(self.entity_url(&self.config.maintenance_entity, None))
            .json(&stored_body(record)?);
        let payload = Self::json(self.send(self.service(builder)).await?).await?;
        debug!("recorded {} for vehicle {}", record.service_type, record.vehicle_id);
        decode_entity(payload)
    }
}

#[async_trait]
impl ReportDispatcher for PlatformClient {
    async fn send_report(&self, request: &ReportRequest) -> Result<(), PlatformError> {
        let url = self.app_url(&format!("functions/{}", self.config.report_function));
        let builder = self.client.post(url).json(request);
        self.send(self.service(builder)).await?;
        Ok(())
    }
}

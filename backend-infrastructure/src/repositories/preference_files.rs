use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tokio::sync::Mutex;
use tracing::debug;

use backend_domain::{EmailReportPreference, PlatformError, PreferenceRepository};

/// Report preferences kept in a local JSON array, for running without the
/// hosted platform.
pub struct PreferenceFileRepository {
    path: PathBuf,
    lock: Mutex<()>,
}

impl PreferenceFileRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    async fn read_all(&self) -> Result<Vec<EmailReportPreference>, PlatformError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(&self.path)
            .await
            .map_err(|err| PlatformError::Storage(err.to_string()))?;
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(&content).map_err(|err| PlatformError::Decode(err.to_string()))
    }

    async fn write_all(&self, items: &[EmailReportPreference]) -> Result<(), PlatformError> {
        if let Some(parent) = Path::new(&self.path).parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .await
                    .map_err(|err| PlatformError::Storage(err.to_string()))?;
            }
        }
        let content = serde_json::to_string_pretty(items)
            .map_err(|err| PlatformError::Decode(err.to_string()))?;
        fs::write(&self.path, content)
            .await
            .map_err(|err| PlatformError::Storage(err.to_string()))
    }
}

#[async_trait]
impl PreferenceRepository for PreferenceFileRepository {
    async fn list(&self) -> Result<Vec<EmailReportPreference>, PlatformError> {
        let _guard = self.lock.lock().await;
        self.read_all().await
    }

    async fn find_by_email(
        &self,
        email: &str,
    ) -> Result<Option<EmailReportPreference>, PlatformError> {
        let _guard = self.lock.lock().await;
        Ok(self
            .read_all()
            .await?
            .into_iter()
            .find(|item| item.user_email.eq_ignore_ascii_case(email)))
    }

    async fn create(
        &self,
        preference: &EmailReportPreference,
    ) -> Result<EmailReportPreference, PlatformError> {
        let _guard = self.lock.lock().await;
        let mut items = self.read_all().await?;
        if items
            .iter()
            .any(|item| item.user_email.eq_ignore_ascii_case(&preference.user_email))
        {
            return Err(PlatformError::Storage(format!(
                "preferences for {} already exist",
                preference.user_email
            )));
        }
        let created = EmailReportPreference {
            id: Some(uuid::Uuid::new_v4().to_string()),
            ..preference.clone()
        };
        items.push(created.clone());
        self.write_all(&items).await?;
        debug!("stored report preferences for {}", created.user_email);
        Ok(created)
    }

    async fn update(
        &self,
        preference: &EmailReportPreference,
    ) -> Result<EmailReportPreference, PlatformError> {
        let id = preference
            .id
            .as_deref()
            .ok_or_else(|| PlatformError::Storage("preference has no id".to_string()))?;
        let _guard = self.lock.lock().await;
        let mut items = self.read_all().await?;
        let slot = items
            .iter_mut()
            .find(|item| item.id.as_deref() == Some(id))
            .ok_or_else(|| PlatformError::Storage(format!("no preference with id {id}")))?;
        *slot = preference.clone();
        self.write_all(&items).await?;
        Ok(preference.clone())
    }
}

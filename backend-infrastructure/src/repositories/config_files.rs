use std::path::Path;

use async_trait::async_trait;
use tokio::fs;
use tracing::{info, warn};

use backend_domain::{AccessPolicy, ConfigRepository};

pub struct ConfigFileRepository;

impl ConfigFileRepository {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ConfigFileRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ConfigRepository for ConfigFileRepository {
    async fn load_access_policies(&self, path: &str) -> anyhow::Result<Vec<AccessPolicy>> {
        if !Path::new(path).exists() {
            warn!("access policy file {} not found, no domain policies loaded", path);
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(path).await?;
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }
        let policies: Vec<AccessPolicy> = serde_yaml::from_str(&content)?;
        let policies: Vec<AccessPolicy> = policies
            .iter()
            .map(AccessPolicy::normalized)
            .filter(|policy| !policy.domain.is_empty())
            .collect();
        info!("loaded {} access policies from {}", policies.len(), path);
        Ok(policies)
    }
}

use anyhow::{anyhow, Result};

pub fn validate_base_url(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(anyhow!("{} must not be empty", field));
    }
    if !value.starts_with("http://") && !value.starts_with("https://") {
        return Err(anyhow!("{} must be an http(s) url", field));
    }
    Ok(())
}

pub fn validate_positive(field: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(anyhow!("{} must be greater than 0", field));
    }
    Ok(())
}

use std::time::Duration;

use backend_domain::{offset_from_minutes, CurrentUserView, PlatformError, UserContext, UserProfile};
use tracing::{error, warn};

use crate::{AppError, AppState};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_backoff_ms: u64,
}

impl RetryPolicy {
    pub fn from_config(state: &AppState) -> Self {
        Self {
            max_retries: state.config.user_info_max_retries,
            base_backoff_ms: state.config.user_info_backoff_ms,
        }
    }

    /// Delay before retry number `retry` (1-based): base, 2x base, 4x base...
    pub fn backoff(&self, retry: u32) -> Duration {
        let factor = 1u64 << retry.saturating_sub(1).min(16);
        Duration::from_millis(self.base_backoff_ms.saturating_mul(factor))
    }
}

async fn fetch_user_with_retry(
    state: &AppState,
    session_token: &str,
    policy: RetryPolicy,
) -> Result<UserProfile, AppError> {
    let mut retry = 0;
    loop {
        match state.user_directory.current_user(session_token).await {
            Ok(user) => return Ok(user),
            Err(PlatformError::Unauthorized) => return Err(AppError::Unauthorized),
            Err(err) => {
                if retry >= policy.max_retries {
                    error!("user info unavailable after {} attempts: {}", retry + 1, err);
                    state.metrics.record_user_info_failure();
                    return Err(AppError::UserInfoUnavailable {
                        attempts: retry + 1,
                    });
                }
                retry += 1;
                let delay = policy.backoff(retry);
                warn!(
                    "user info fetch failed (retry {} in {:?}): {}",
                    retry, delay, err
                );
                tokio::time::sleep(delay).await;
            }
        }
    }
}

/// Builds the caller's context. No session means the public view.
/// The offset comes from the header override, then the profile, then config.
pub async fn resolve_user_context(
    state: &AppState,
    session_token: Option<&str>,
    utc_offset_override: Option<i32>,
) -> Result<UserContext, AppError> {
    let session_token = session_token.map(str::trim).filter(|token| !token.is_empty());
    let user = match session_token {
        Some(token) => Some(fetch_user_with_retry(state, token, RetryPolicy::from_config(state)).await?),
        None => None,
    };
    let minutes = utc_offset_override
        .or_else(|| user.as_ref().and_then(|user| user.utc_offset_minutes))
        .unwrap_or(state.config.default_utc_offset_minutes);
    Ok(UserContext::new(user, offset_from_minutes(minutes)))
}

pub fn current_user_view(ctx: &UserContext) -> CurrentUserView {
    CurrentUserView::from(ctx)
}

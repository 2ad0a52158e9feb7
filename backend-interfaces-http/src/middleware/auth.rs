use axum::http::HeaderMap;

use backend_application::queries::user_queries;
use backend_application::AppState;
use backend_domain::{RuntimeConfig, UserContext};

use crate::error::HttpError;

pub const SESSION_TOKEN_HEADER: &str = "X-Session-Token";
pub const UTC_OFFSET_HEADER: &str = "X-Utc-Offset-Minutes";

pub fn authorize(config: &RuntimeConfig, headers: &HeaderMap) -> bool {
    if let Some(api_token) = &config.api_token {
        return extract_bearer(headers)
            .map(|v| v == *api_token)
            .unwrap_or(false);
    }
    true
}

pub fn session_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(SESSION_TOKEN_HEADER)?.to_str().ok()?.trim();
    (!value.is_empty()).then(|| value.to_string())
}

/// Minutes east of UTC, as sent by the browser. Values outside +-14h are ignored.
pub fn utc_offset_override(headers: &HeaderMap) -> Option<i32> {
    let minutes: i32 = headers
        .get(UTC_OFFSET_HEADER)?
        .to_str()
        .ok()?
        .trim()
        .parse()
        .ok()?;
    (minutes.abs() <= 14 * 60).then_some(minutes)
}

/// API token check followed by user resolution.
pub async fn user_context(
    state: &AppState,
    headers: &HeaderMap,
) -> Result<UserContext, HttpError> {
    if !authorize(&state.config, headers) {
        return Err(HttpError::Unauthorized);
    }
    let token = session_token(headers);
    let ctx = user_queries::resolve_user_context(
        state,
        token.as_deref(),
        utc_offset_override(headers),
    )
    .await?;
    Ok(ctx)
}

fn extract_bearer(headers: &HeaderMap) -> Option<String> {
    let value = headers.get("Authorization")?.to_str().ok()?.trim();
    let prefix = "Bearer ";
    if !value.starts_with(prefix) {
        return None;
    }
    let token = value[prefix.len()..].trim();
    if token.is_empty() {
        return None;
    }
    Some(token.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut headers = HeaderMap::new();
        for (name, value) in pairs {
            headers.insert(*name, HeaderValue::from_static(value));
        }
        headers
    }

    #[test]
    fn bearer_token_must_match_when_configured() {
        let mut config = RuntimeConfig::default();
        assert!(authorize(&config, &HeaderMap::new()));

        config.api_token = Some("secret".to_string());
        assert!(!authorize(&config, &HeaderMap::new()));
        assert!(!authorize(&config, &headers(&[("Authorization", "Bearer nope")])));
        assert!(authorize(&config, &headers(&[("Authorization", "Bearer secret")])));
    }

    #[test]
    fn session_and_offset_headers() {
        let map = headers(&[
            ("X-Session-Token", "  abc "),
            ("X-Utc-Offset-Minutes", "-300"),
        ]);
        assert_eq!(session_token(&map).as_deref(), Some("abc"));
        assert_eq!(utc_offset_override(&map), Some(-300));

        let map = headers(&[("X-Session-Token", " "), ("X-Utc-Offset-Minutes", "9999")]);
        assert_eq!(session_token(&map), None);
        assert_eq!(utc_offset_override(&map), None);
    }
}

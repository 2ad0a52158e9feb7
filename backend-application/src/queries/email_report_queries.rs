use tracing::error;

use backend_domain::{EmailReportPreference, UserContext};

use crate::{AppError, AppState};

/// Caller's email when they may manage report subscriptions.
pub(crate) fn report_owner(ctx: &UserContext) -> Result<&str, AppError> {
    let email = ctx.email().ok_or(AppError::Unauthorized)?;
    if !ctx.capabilities().can_manage_email_reports {
        return Err(AppError::Forbidden("email reports".to_string()));
    }
    Ok(email)
}

/// Stored preferences, or the defaults for a user who never saved any.
pub async fn get_preferences(
    state: &AppState,
    ctx: &UserContext,
) -> Result<EmailReportPreference, AppError> {
    let email = report_owner(ctx)?;
    let stored = state
        .preference_repo
        .find_by_email(email)
        .await
        .map_err(|err| {
            error!("failed to load report preferences for {}: {}", email, err);
            AppError::from(err)
        })?;
    Ok(stored.unwrap_or_else(|| EmailReportPreference::defaults_for(email)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{profile, TestHarness};
    use backend_domain::ReportFrequency;

    #[tokio::test]
    async fn defaults_for_new_user() {
        let harness = TestHarness::new().with_user(profile("ops@boral.com.au", "viewer"));
        let ctx = harness.signed_in().await;
        let pref = get_preferences(&harness.state, &ctx).await.expect("prefs");
        assert!(!pref.enabled);
        assert_eq!(pref.frequency, ReportFrequency::Weekly);
        assert!(pref.report_types.is_empty());
        assert!(pref.include_charts && pref.include_ai_insights);
        assert!(pref.id.is_none());
    }

    #[tokio::test]
    async fn anonymous_callers_have_no_preferences() {
        let harness = TestHarness::new();
        let err = get_preferences(&harness.state, &harness.anonymous())
            .await
            .expect_err("unauthorized");
        assert!(matches!(err, AppError::Unauthorized));
    }
}

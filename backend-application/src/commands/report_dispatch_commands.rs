use chrono::{DateTime, Utc};
use tracing::{error, info, warn};

use backend_domain::services::{is_due, next_send_time, ScheduleSpec};
use backend_domain::{
    offset_from_minutes, DispatchFailure, DispatchResults, EmailReportPreference, PlatformError,
};

use crate::{AppError, AppState};

enum Outcome {
    Sent,
    Skipped,
}

async fn dispatch_one(
    state: &AppState,
    preference: &EmailReportPreference,
    now: DateTime<Utc>,
) -> Result<Outcome, PlatformError> {
    if !preference.enabled || !is_due(preference.frequency, preference.last_sent, now) {
        return Ok(Outcome::Skipped);
    }
    if preference.user_email.trim().is_empty() {
        warn!("skipping report preference {:?} without an email", preference.id);
        return Ok(Outcome::Skipped);
    }

    state
        .report_dispatcher
        .send_report(&preference.to_report_request())
        .await?;

    let offset = offset_from_minutes(
        preference
            .utc_offset_minutes
            .unwrap_or(state.config.default_utc_offset_minutes),
    );
    let next_scheduled = match ScheduleSpec::from_preference(preference) {
        Ok(spec) => Some(next_send_time(&spec, now.with_timezone(&offset)).with_timezone(&Utc)),
        Err(err) => {
            warn!("stored schedule for {} is invalid: {}", preference.user_email, err);
            None
        }
    };
    let updated = EmailReportPreference {
        last_sent: Some(now),
        next_scheduled,
        ..preference.clone()
    };
    state.preference_repo.update(&updated).await?;
    Ok(Outcome::Sent)
}

/// Sends every enabled, due report. One user's failure is recorded and the
/// batch moves on.
pub async fn dispatch_scheduled_reports(
    state: &AppState,
    now: DateTime<Utc>,
) -> Result<DispatchResults, AppError> {
    let preferences = state.preference_repo.list().await.map_err(|err| {
        error!("failed to list report preferences: {}", err);
        AppError::from(err)
    })?;

    let mut results = DispatchResults {
        total: preferences.len(),
        ..DispatchResults::default()
    };
    for preference in &preferences {
        match dispatch_one(state, preference, now).await {
            Ok(Outcome::Sent) => {
                info!("sent scheduled report to {}", preference.user_email);
                results.sent += 1;
            }
            Ok(Outcome::Skipped) => results.skipped += 1,
            Err(err) => {
                warn!(
                    "scheduled report for {} failed: {}",
                    preference.user_email, err
                );
                results.failed += 1;
                results.errors.push(DispatchFailure {
                    email: preference.user_email.clone(),
                    error: err.to_string(),
                });
            }
        }
    }

    state.metrics.record_dispatch(&results);
    info!(
        "report dispatch finished: total={} sent={} skipped={} failed={}",
        results.total, results.sent, results.skipped, results.failed
    );
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{stored_preference, TestHarness};
    use backend_domain::ReportFrequency;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 6, 9, 0, 0).single().expect("now")
    }

    #[tokio::test]
    async fn tallies_disabled_recent_and_due_users() {
        let harness = TestHarness::new();
        let mut disabled = stored_preference("off@boral.com.au", ReportFrequency::Daily);
        disabled.enabled = false;
        let mut recent = stored_preference("recent@boral.com.au", ReportFrequency::Daily);
        recent.last_sent = Some(now() - Duration::hours(10));
        let mut due = stored_preference("due@boral.com.au", ReportFrequency::Daily);
        due.last_sent = Some(now() - Duration::hours(30));
        harness.preferences.seed(vec![disabled, recent, due]);

        let results = dispatch_scheduled_reports(&harness.state, now())
            .await
            .expect("dispatch");
        assert_eq!(
            (results.total, results.sent, results.skipped, results.failed),
            (3, 1, 2, 0)
        );
        assert!(results.errors.is_empty());

        let sent = harness.dispatcher.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].user_email, "due@boral.com.au");

        let stored = harness.preferences.by_email("due@boral.com.au").expect("stored");
        assert_eq!(stored.last_sent, Some(now()));
        assert!(stored.next_scheduled.is_some_and(|next| next > now()));
    }

    #[tokio::test]
    async fn one_failure_does_not_block_the_batch() {
        let harness = TestHarness::new();
        harness.preferences.seed(vec![
            stored_preference("broken@boral.com.au", ReportFrequency::Weekly),
            stored_preference("ok@boral.com.au", ReportFrequency::Monthly),
        ]);
        harness.dispatcher.fail_for("broken@boral.com.au");

        let results = dispatch_scheduled_reports(&harness.state, now())
            .await
            .expect("dispatch");
        assert_eq!((results.sent, results.failed), (1, 1));
        assert_eq!(results.errors[0].email, "broken@boral.com.au");
        assert!(harness
            .preferences
            .by_email("broken@boral.com.au")
            .is_some_and(|pref| pref.last_sent.is_none()));
    }

    #[tokio::test]
    async fn rows_with_null_fields_are_sent_or_counted() {
        let harness = TestHarness::new();
        let rows = serde_json::json!([
            {"id": "p1", "user_email": "ok@boral.com.au", "enabled": true,
             "frequency": "daily", "report_types": ["compliance"]},
            {"id": "p2", "user_email": "charts@boral.com.au", "enabled": true,
             "frequency": "weekly", "report_types": ["costs"], "include_charts": null},
            {"id": "p3", "user_email": "days@boral.com.au", "enabled": true,
             "frequency": null, "day_of_week": null, "report_types": null},
            {"id": "p4", "user_email": "odd@boral.com.au", "enabled": true,
             "frequency": "fortnightly", "report_types": ["refills"]},
        ]);
        let preferences: Vec<EmailReportPreference> =
            serde_json::from_value(rows).expect("stored rows decode");
        harness.preferences.seed(preferences);

        let results = dispatch_scheduled_reports(&harness.state, now())
            .await
            .expect("dispatch");
        assert_eq!(
            (results.total, results.sent, results.skipped, results.failed),
            (4, 3, 1, 0)
        );

        let sent = harness.dispatcher.sent();
        let charts = sent
            .iter()
            .find(|request| request.user_email == "charts@boral.com.au")
            .expect("charts report sent");
        assert!(charts.include_charts);
        let days = sent
            .iter()
            .find(|request| request.user_email == "days@boral.com.au")
            .expect("null schedule report sent");
        assert!(days.report_types.is_empty());
        assert!(harness
            .preferences
            .by_email("days@boral.com.au")
            .is_some_and(|pref| pref.next_scheduled.is_some()));
        assert!(harness
            .preferences
            .by_email("odd@boral.com.au")
            .is_some_and(|pref| pref.last_sent.is_none()));
    }
}

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::{error, info};

use backend_domain::services::{next_send_time, ScheduleSpec};
use backend_domain::{
    EmailReportPreference, EmailReportPreferenceUpdate, ReportFrequency, ReportRequest, ReportType,
    UserContext,
};

use crate::queries::email_report_queries::report_owner;
use crate::{AppError, AppState};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SendNowRequest {
    #[serde(default)]
    pub report_types: Vec<String>,
    pub include_charts: Option<bool>,
    pub include_ai_insights: Option<bool>,
}

fn normalize_report_types(raw: Vec<String>) -> Result<Vec<String>, AppError> {
    let mut types: Vec<ReportType> = Vec::new();
    for value in raw {
        let report_type = ReportType::from_id(&value)
            .ok_or_else(|| AppError::BadRequest(format!("unknown report type '{}'", value.trim())))?;
        if !types.contains(&report_type) {
            types.push(report_type);
        }
    }
    Ok(types.iter().map(|kind| kind.as_str().to_string()).collect())
}

pub async fn save_preferences(
    state: &AppState,
    ctx: &UserContext,
    update: EmailReportPreferenceUpdate,
) -> Result<EmailReportPreference, AppError> {
    save_preferences_at(state, ctx, update, Utc::now()).await
}

pub async fn save_preferences_at(
    state: &AppState,
    ctx: &UserContext,
    update: EmailReportPreferenceUpdate,
    now: DateTime<Utc>,
) -> Result<EmailReportPreference, AppError> {
    let email = report_owner(ctx)?;
    let frequency = ReportFrequency::parse(&update.frequency).ok_or_else(|| {
        AppError::BadRequest(format!("unknown frequency '{}'", update.frequency))
    })?;
    let report_types = normalize_report_types(update.report_types)?;
    if update.enabled && report_types.is_empty() {
        return Err(AppError::BadRequest(
            "select at least one report type to enable scheduled reports".to_string(),
        ));
    }
    let time_of_day = update.time_of_day.trim().to_string();
    let spec = ScheduleSpec::new(frequency, &time_of_day, update.day_of_week, update.day_of_month)
        .map_err(|err| AppError::BadRequest(err.to_string()))?;

    let existing = state.preference_repo.find_by_email(email).await?;
    let next_scheduled = update
        .enabled
        .then(|| next_send_time(&spec, now.with_timezone(&ctx.offset)).with_timezone(&Utc));

    let preference = EmailReportPreference {
        id: existing.as_ref().and_then(|pref| pref.id.clone()),
        user_email: email.to_string(),
        enabled: update.enabled,
        frequency,
        report_types,
        include_charts: update.include_charts,
        include_ai_insights: update.include_ai_insights,
        time_of_day,
        day_of_week: update.day_of_week,
        day_of_month: update.day_of_month,
        utc_offset_minutes: Some(ctx.offset.local_minus_utc() / 60),
        last_sent: existing.as_ref().and_then(|pref| pref.last_sent),
        next_scheduled,
    };

    let saved = if preference.id.is_some() {
        state.preference_repo.update(&preference).await
    } else {
        state.preference_repo.create(&preference).await
    }
    .map_err(|err| {
        error!("failed to save report preferences for {}: {}", email, err);
        AppError::from(err)
    })?;
    info!(
        "saved report preferences for {} ({}, enabled={})",
        email,
        saved.frequency.as_str(),
        saved.enabled
    );
    Ok(saved)
}

/// Sends a report to the caller immediately, outside the schedule.
pub async fn send_now(
    state: &AppState,
    ctx: &UserContext,
    request: SendNowRequest,
) -> Result<ReportRequest, AppError> {
    let email = report_owner(ctx)?;
    let stored = state.preference_repo.find_by_email(email).await?;
    let base = stored.unwrap_or_else(|| EmailReportPreference::defaults_for(email));

    let report_types = if request.report_types.is_empty() {
        normalize_report_types(base.report_types.clone())?
    } else {
        normalize_report_types(request.report_types)?
    };
    if report_types.is_empty() {
        return Err(AppError::BadRequest(
            "select at least one report type".to_string(),
        ));
    }

    let report = ReportRequest {
        user_email: email.to_string(),
        report_types,
        include_charts: request.include_charts.unwrap_or(base.include_charts),
        include_ai_insights: request.include_ai_insights.unwrap_or(base.include_ai_insights),
    };
    state
        .report_dispatcher
        .send_report(&report)
        .await
        .map_err(|err| {
            error!("failed to send report to {}: {}", email, err);
            AppError::from(err)
        })?;
    state.metrics.record_report_sent();
    info!("sent on-demand report to {}", email);
    Ok(report)
}

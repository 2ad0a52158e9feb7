use chrono::{DateTime, Utc};
use tracing::{error, info};

use backend_domain::services::{analyze_refills, filter_refills, filter_scans, resolve_scope, DataScope};
use backend_domain::{FleetQuery, RefillAnalysis, Site, UserContext, VendorError};

use crate::{AppError, AppState};

pub(crate) async fn sites_for_scope(
    state: &AppState,
    scope: &DataScope,
) -> Result<Vec<Site>, VendorError> {
    match scope {
        DataScope::Customer(_) | DataScope::Sites(_) => state.vendor.list_sites(None).await,
        _ => Ok(Vec::new()),
    }
}

pub async fn refill_analysis(
    state: &AppState,
    ctx: &UserContext,
    query: FleetQuery,
) -> Result<RefillAnalysis, AppError> {
    refill_analysis_at(state, ctx, query, Utc::now()).await
}

pub async fn refill_analysis_at(
    state: &AppState,
    ctx: &UserContext,
    query: FleetQuery,
    now: DateTime<Utc>,
) -> Result<RefillAnalysis, AppError> {
    if !ctx.capabilities().can_view_refills {
        return Err(AppError::Forbidden("refill analytics".to_string()));
    }
    let scope = resolve_scope(ctx, &state.access_policies.read().await);
    let filter = query.to_filter();

    let (refills, scans, sites) = tokio::try_join!(
        state.vendor.list_refills(&filter),
        state.vendor.list_scans(&filter),
        sites_for_scope(state, &scope),
    )
    .map_err(|err| {
        error!("failed to load refill data: {}", err);
        state.metrics.record_vendor_error();
        AppError::Vendor(err)
    })?;

    let refills = filter_refills(&scope, refills, &sites);
    let scans = filter_scans(&scope, scans, &sites);
    let analysis = analyze_refills(
        &refills,
        &scans,
        now.with_timezone(&ctx.offset),
        &state.forecast_settings(),
    );
    info!(
        "refill analysis: {} sites, {} critical, {} warning",
        analysis.total_sites, analysis.critical_sites, analysis.warning_sites
    );
    state.metrics.record_refill_analysis();
    Ok(analysis)
}

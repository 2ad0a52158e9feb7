use tracing::error;

use backend_domain::services::{filter_fleet, filter_scans, resolve_scope, summarize_compliance};
use backend_domain::{ComplianceSummary, FleetQuery, UserContext};

use crate::queries::refill_analysis_queries::sites_for_scope;
use crate::{AppError, AppState};

pub async fn compliance_summary(
    state: &AppState,
    ctx: &UserContext,
    query: FleetQuery,
) -> Result<ComplianceSummary, AppError> {
    if !ctx.capabilities().can_view_compliance {
        return Err(AppError::Forbidden("compliance".to_string()));
    }
    let scope = resolve_scope(ctx, &state.access_policies.read().await);
    let filter = query.to_filter();

    let (vehicles, scans, sites) = tokio::try_join!(
        state.vendor.list_vehicles(&filter),
        state.vendor.list_scans(&filter),
        sites_for_scope(state, &scope),
    )
    .map_err(|err| {
        error!("failed to load compliance data: {}", err);
        state.metrics.record_vendor_error();
        AppError::Vendor(err)
    })?;

    let scans = filter_scans(&scope, scans, &sites);
    let (vehicles, _) = filter_fleet(&scope, vehicles, sites);
    state.metrics.record_compliance_query();
    Ok(summarize_compliance(&vehicles, &scans))
}

use chrono::{DateTime, Utc};
use tracing::{error, info};

use backend_domain::services::{
    filter_devices, filter_fleet, filter_maintenance, resolve_scope, summarize_maintenance,
    urgent_items, DataScope,
};
use backend_domain::{
    FleetQuery, MaintenanceRecord, MaintenanceSummary, UrgentItem, UserContext, Vehicle,
    VendorFilter,
};

use crate::queries::refill_analysis_queries::sites_for_scope;
use crate::{AppError, AppState};

const ACTIVE_DEVICES: &str = "active";

/// Vehicles the caller may see under `scope`.
pub(crate) async fn visible_vehicles(
    state: &AppState,
    scope: &DataScope,
    filter: &VendorFilter,
) -> Result<Vec<Vehicle>, AppError> {
    let (vehicles, sites) = tokio::try_join!(
        state.vendor.list_vehicles(filter),
        sites_for_scope(state, scope),
    )
    .map_err(|err| {
        error!("failed to load fleet for maintenance: {}", err);
        state.metrics.record_vendor_error();
        AppError::Vendor(err)
    })?;
    Ok(filter_fleet(scope, vehicles, sites).0)
}

async fn scoped_records(
    state: &AppState,
    scope: &DataScope,
) -> Result<Vec<MaintenanceRecord>, AppError> {
    let records = state.maintenance_repo.list_records().await.map_err(|err| {
        error!("failed to load maintenance records: {}", err);
        AppError::from(err)
    })?;
    if *scope == DataScope::All {
        return Ok(records);
    }
    let vehicles = visible_vehicles(state, scope, &VendorFilter::default()).await?;
    Ok(filter_maintenance(scope, records, &vehicles))
}

pub async fn maintenance_summary(
    state: &AppState,
    ctx: &UserContext,
) -> Result<MaintenanceSummary, AppError> {
    maintenance_summary_at(state, ctx, Utc::now()).await
}

pub async fn maintenance_summary_at(
    state: &AppState,
    ctx: &UserContext,
    now: DateTime<Utc>,
) -> Result<MaintenanceSummary, AppError> {
    if !ctx.capabilities().can_view_maintenance {
        return Err(AppError::Forbidden("maintenance".to_string()));
    }
    let scope = resolve_scope(ctx, &state.access_policies.read().await);
    let records = scoped_records(state, &scope).await?;
    let summary = summarize_maintenance(&records, now);
    info!(
        "maintenance summary: {} records, {} upcoming, {} overdue",
        summary.record_count,
        summary.upcoming.len(),
        summary.overdue.len()
    );
    state.metrics.record_maintenance_query();
    Ok(summary)
}

pub async fn fleet_urgent_items(
    state: &AppState,
    ctx: &UserContext,
    query: FleetQuery,
) -> Result<Vec<UrgentItem>, AppError> {
    fleet_urgent_items_at(state, ctx, query, Utc::now()).await
}

/// Maintenance items are only raised for callers who may view maintenance.
pub async fn fleet_urgent_items_at(
    state: &AppState,
    ctx: &UserContext,
    query: FleetQuery,
    now: DateTime<Utc>,
) -> Result<Vec<UrgentItem>, AppError> {
    let capabilities = ctx.capabilities();
    if !capabilities.can_view_compliance {
        return Err(AppError::Forbidden("fleet overview".to_string()));
    }
    let scope = resolve_scope(ctx, &state.access_policies.read().await);
    let filter = query.to_filter();

    let (vehicles, devices, sites) = tokio::try_join!(
        state.vendor.list_vehicles(&filter),
        state.vendor.list_devices(Some(ACTIVE_DEVICES)),
        sites_for_scope(state, &scope),
    )
    .map_err(|err| {
        error!("failed to load fleet overview: {}", err);
        state.metrics.record_vendor_error();
        AppError::Vendor(err)
    })?;

    let devices = filter_devices(&scope, devices, &sites);
    let (vehicles, _) = filter_fleet(&scope, vehicles, sites);
    let records = if capabilities.can_view_maintenance {
        let records = state.maintenance_repo.list_records().await?;
        filter_maintenance(&scope, records, &vehicles)
    } else {
        Vec::new()
    };
    Ok(urgent_items(&vehicles, &records, &devices, now))
}

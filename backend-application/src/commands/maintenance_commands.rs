use tracing::{error, info};

use backend_domain::services::{resolve_scope, DataScope};
use backend_domain::{MaintenanceRecord, NewMaintenanceRecord, UserContext, VendorFilter};

use crate::queries::maintenance_queries::visible_vehicles;
use crate::{AppError, AppState};

fn validate(record: &MaintenanceRecord) -> Result<(), AppError> {
    if record.vehicle_id.is_empty() {
        return Err(AppError::BadRequest("vehicle_id is required".to_string()));
    }
    if record.service_type.is_empty() {
        return Err(AppError::BadRequest("service_type is required".to_string()));
    }
    if let Some(cost) = record.cost {
        if !cost.is_finite() || cost < 0.0 {
            return Err(AppError::BadRequest("cost must be zero or more".to_string()));
        }
    }
    if let (Some(served), Some(next)) = (record.service_date, record.next_service_date) {
        if next <= served {
            return Err(AppError::BadRequest(
                "next_service_date must be after service_date".to_string(),
            ));
        }
    }
    Ok(())
}

pub async fn record_maintenance(
    state: &AppState,
    ctx: &UserContext,
    request: NewMaintenanceRecord,
) -> Result<MaintenanceRecord, AppError> {
    if !ctx.capabilities().can_edit_maintenance {
        return Err(AppError::Forbidden("maintenance".to_string()));
    }
    let record = request.into_record();
    validate(&record)?;

    let scope = resolve_scope(ctx, &state.access_policies.read().await);
    if scope != DataScope::All {
        let vehicles = visible_vehicles(state, &scope, &VendorFilter::default()).await?;
        if !vehicles.iter().any(|vehicle| vehicle.id == record.vehicle_id) {
            return Err(AppError::Forbidden(format!("vehicle {}", record.vehicle_id)));
        }
    }

    let saved = state
        .maintenance_repo
        .create_record(&record)
        .await
        .map_err(|err| {
            error!("failed to record maintenance for {}: {}", record.vehicle_id, err);
            AppError::from(err)
        })?;
    info!("recorded {} for vehicle {}", saved.service_type, saved.vehicle_id);
    Ok(saved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{day, profile, site, vehicle, TestHarness};

    fn request(vehicle_id: &str) -> NewMaintenanceRecord {
        NewMaintenanceRecord {
            vehicle_id: vehicle_id.to_string(),
            service_type: "Oil_Change".to_string(),
            service_date: day(0),
            next_service_date: Some(day(90)),
            cost: Some(180.0),
            notes: None,
        }
    }

    #[tokio::test]
    async fn technician_records_a_service() {
        let harness = TestHarness::new().with_user(profile("t@boral.com.au", "technician"));
        let ctx = harness.signed_in().await;
        let saved = record_maintenance(&harness.state, &ctx, request("V-1"))
            .await
            .expect("saved");
        assert!(saved.id.is_some());
        assert_eq!(saved.service_type, "oil_change");
        assert_eq!(harness.maintenance.all().len(), 1);
    }

    #[tokio::test]
    async fn viewers_cannot_record() {
        let harness = TestHarness::new().with_user(profile("v@boral.com.au", "viewer"));
        let ctx = harness.signed_in().await;
        let err = record_maintenance(&harness.state, &ctx, request("V-1"))
            .await
            .expect_err("forbidden");
        assert!(matches!(err, AppError::Forbidden(_)));
        assert!(harness.maintenance.all().is_empty());
    }

    #[tokio::test]
    async fn site_manager_is_limited_to_their_sites() {
        let mut manager = profile("m@boral.com.au", "site_manager");
        manager.assigned_sites = vec!["S-1".to_string()];
        let harness = TestHarness::new().with_user(manager);
        harness
            .vendor
            .set_sites(vec![site("S-1", "Wacol", "Boral"), site("S-2", "Rocklea", "Boral")]);
        harness.vendor.set_vehicles(vec![
            vehicle("V-1", "S-1", 0.0, 10.0),
            vehicle("V-2", "S-2", 0.0, 10.0),
        ]);
        let ctx = harness.signed_in().await;
        assert!(record_maintenance(&harness.state, &ctx, request("V-1")).await.is_ok());
        let err = record_maintenance(&harness.state, &ctx, request("V-2"))
            .await
            .expect_err("other site");
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[tokio::test]
    async fn bad_records_are_rejected() {
        let harness = TestHarness::new().with_user(profile("t@boral.com.au", "technician"));
        let ctx = harness.signed_in().await;
        let cases = [
            NewMaintenanceRecord {
                vehicle_id: "  ".to_string(),
                ..request("V-1")
            },
            NewMaintenanceRecord {
                cost: Some(-5.0),
                ..request("V-1")
            },
            NewMaintenanceRecord {
                next_service_date: Some(day(-1)),
                ..request("V-1")
            },
        ];
        for case in cases {
            let err = record_maintenance(&harness.state, &ctx, case)
                .await
                .expect_err("rejected");
            assert!(matches!(err, AppError::BadRequest(_)));
        }
    }
}

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Duration, Utc};

use crate::entities::{
    Device, MaintenanceRecord, MaintenanceSummary, MonthlyCost, ServiceTypeCount, UrgentItem,
    UrgentItemKind, Vehicle,
};
use crate::utils::hours_between;

const MONTHLY_COST_LIMIT: usize = 12;
const UPCOMING_SERVICE_DAYS: i64 = 30;
const URGENT_SERVICE_DAYS: i64 = 7;
const BELOW_TARGET_RATIO: f64 = 0.75;
const DEVICE_OFFLINE_HOURS: f64 = 24.0;

fn is_overdue(record: &MaintenanceRecord, now: DateTime<Utc>) -> bool {
    record.next_service_date.is_some_and(|next| next < now)
}

pub fn summarize_maintenance(
    records: &[MaintenanceRecord],
    now: DateTime<Utc>,
) -> MaintenanceSummary {
    let mut total_cost = 0.0;
    let mut months: BTreeMap<String, f64> = BTreeMap::new();
    let mut types: HashMap<&str, usize> = HashMap::new();

    for record in records {
        if let Some(cost) = record.cost.filter(|cost| *cost != 0.0) {
            total_cost += cost;
            if let Some(date) = record.service_date {
                *months.entry(date.format("%Y-%m").to_string()).or_default() += cost;
            }
        }
        let service_type = record.service_type.trim();
        let service_type = if service_type.is_empty() { "other" } else { service_type };
        *types.entry(service_type).or_default() += 1;
    }

    let skip = months.len().saturating_sub(MONTHLY_COST_LIMIT);
    let monthly_costs = months
        .into_iter()
        .skip(skip)
        .map(|(month, cost)| MonthlyCost {
            month,
            cost: cost.round(),
        })
        .collect();

    let mut service_types: Vec<ServiceTypeCount> = types
        .into_iter()
        .map(|(service_type, count)| ServiceTypeCount {
            service_type: service_type.to_string(),
            count,
        })
        .collect();
    service_types.sort_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then_with(|| a.service_type.cmp(&b.service_type))
    });

    let horizon = now + Duration::days(UPCOMING_SERVICE_DAYS);
    let mut upcoming: Vec<MaintenanceRecord> = records
        .iter()
        .filter(|record| {
            record
                .next_service_date
                .is_some_and(|next| next >= now && next <= horizon)
        })
        .cloned()
        .collect();
    upcoming.sort_by_key(|record| record.next_service_date);

    let overdue = records
        .iter()
        .filter(|record| is_overdue(record, now))
        .cloned()
        .collect();

    MaintenanceSummary {
        record_count: records.len(),
        total_cost,
        average_cost: if records.is_empty() {
            0.0
        } else {
            total_cost / records.len() as f64
        },
        monthly_costs,
        service_types,
        upcoming,
        overdue,
    }
}

/// Most recent service per vehicle; undated records lose to dated ones.
fn latest_by_vehicle(records: &[MaintenanceRecord]) -> HashMap<&str, &MaintenanceRecord> {
    let mut latest: HashMap<&str, &MaintenanceRecord> = HashMap::new();
    for record in records {
        latest
            .entry(record.vehicle_id.as_str())
            .and_modify(|current| {
                if record.service_date > current.service_date {
                    *current = record;
                }
            })
            .or_insert(record);
    }
    latest
}

pub fn is_device_offline(device: &Device, now: DateTime<Utc>) -> bool {
    match device.last_scan_at {
        Some(last) => hours_between(last, now) >= DEVICE_OFFLINE_HOURS,
        None => true,
    }
}

fn push_item(items: &mut Vec<UrgentItem>, kind: UrgentItemKind, ids: Vec<String>) {
    if !ids.is_empty() {
        items.push(UrgentItem {
            kind,
            count: ids.len(),
            ids,
        });
    }
}

/// Dashboard calls to action, most pressing first. Kinds with nothing to
/// report are left out. `records` is empty when maintenance is not visible.
pub fn urgent_items(
    vehicles: &[Vehicle],
    records: &[MaintenanceRecord],
    devices: &[Device],
    now: DateTime<Utc>,
) -> Vec<UrgentItem> {
    let latest = latest_by_vehicle(records);
    let next_service = |vehicle: &Vehicle| {
        latest
            .get(vehicle.id.as_str())
            .and_then(|record| record.next_service_date)
    };

    let overdue = vehicles
        .iter()
        .filter(|vehicle| next_service(vehicle).is_some_and(|next| next < now))
        .map(|vehicle| vehicle.id.clone())
        .collect();
    let below_target = vehicles
        .iter()
        .filter(|vehicle| vehicle.is_below(BELOW_TARGET_RATIO))
        .map(|vehicle| vehicle.id.clone())
        .collect();
    let offline = devices
        .iter()
        .filter(|device| is_device_offline(device, now))
        .map(|device| device.id.clone())
        .collect();
    // Whole days ahead, so a service later today is neither overdue nor due soon.
    let due_soon = vehicles
        .iter()
        .filter(|vehicle| {
            next_service(vehicle).is_some_and(|next| {
                let days = (next - now).num_days();
                days > 0 && days <= URGENT_SERVICE_DAYS
            })
        })
        .map(|vehicle| vehicle.id.clone())
        .collect();

    let mut items = Vec::new();
    push_item(&mut items, UrgentItemKind::MaintenanceOverdue, overdue);
    push_item(&mut items, UrgentItemKind::BelowTarget, below_target);
    push_item(&mut items, UrgentItemKind::DevicesOffline, offline);
    push_item(&mut items, UrgentItemKind::MaintenanceUpcoming, due_soon);
    items
}

use std::collections::HashSet;

use crate::entities::{
    AccessPolicy, Device, MaintenanceRecord, RefillEvent, ScanEvent, Site, UserContext, Vehicle,
};
use crate::value_objects::Role;

/// Slice of the fleet a user may see.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataScope {
    All,
    Customer(String),
    Sites(Vec<String>),
    Vehicles(Vec<String>),
    Nothing,
}

pub fn policy_for<'a>(policies: &'a [AccessPolicy], email: &str) -> Option<&'a AccessPolicy> {
    let domain = email.split_once('@')?.1.trim().to_lowercase();
    policies
        .iter()
        .find(|policy| policy.domain.eq_ignore_ascii_case(&domain))
}

/// Domain policy wins over role. A customer filter wins over `show_all_data`.
pub fn resolve_scope(ctx: &UserContext, policies: &[AccessPolicy]) -> DataScope {
    let Some(user) = ctx.user.as_ref() else {
        return DataScope::All;
    };
    if let Some(policy) = policy_for(policies, &user.email) {
        if let Some(customer) = &policy.filter_by_customer {
            return DataScope::Customer(customer.clone());
        }
        if policy.show_all_data {
            return DataScope::All;
        }
    }
    if ctx.role.sees_all_data() {
        return DataScope::All;
    }
    match ctx.role {
        Role::SiteManager => DataScope::Sites(user.assigned_sites.clone()),
        Role::Driver => DataScope::Vehicles(user.assigned_vehicles.clone()),
        _ => DataScope::Nothing,
    }
}

fn same_name(a: &str, b: &str) -> bool {
    a.trim().eq_ignore_ascii_case(b.trim())
}

pub fn filter_fleet(scope: &DataScope, vehicles: Vec<Vehicle>, sites: Vec<Site>) -> (Vec<Vehicle>, Vec<Site>) {
    match scope {
        DataScope::All => (vehicles, sites),
        DataScope::Customer(customer) => (
            vehicles
                .into_iter()
                .filter(|vehicle| same_name(&vehicle.customer_name, customer))
                .collect(),
            sites
                .into_iter()
                .filter(|site| same_name(&site.customer_name, customer))
                .collect(),
        ),
        DataScope::Sites(site_ids) => (
            vehicles
                .into_iter()
                .filter(|vehicle| site_ids.contains(&vehicle.site_id))
                .collect(),
            sites
                .into_iter()
                .filter(|site| site_ids.contains(&site.id))
                .collect(),
        ),
        DataScope::Vehicles(vehicle_ids) => (
            vehicles
                .into_iter()
                .filter(|vehicle| vehicle_ids.contains(&vehicle.id))
                .collect(),
            Vec::new(),
        ),
        DataScope::Nothing => (Vec::new(), Vec::new()),
    }
}

/// Lower-cased names of the sites visible under `scope`, when the scope is site based.
fn visible_site_names(scope: &DataScope, sites: &[Site]) -> HashSet<String> {
    sites
        .iter()
        .filter(|site| match scope {
            DataScope::Customer(customer) => same_name(&site.customer_name, customer),
            DataScope::Sites(site_ids) => site_ids.contains(&site.id),
            _ => false,
        })
        .map(|site| site.name.trim().to_lowercase())
        .collect()
}

pub fn filter_refills(scope: &DataScope, refills: Vec<RefillEvent>, sites: &[Site]) -> Vec<RefillEvent> {
    match scope {
        DataScope::All => refills,
        DataScope::Customer(customer) => refills
            .into_iter()
            .filter(|refill| same_name(&refill.customer, customer))
            .collect(),
        DataScope::Sites(_) => {
            let names = visible_site_names(scope, sites);
            refills
                .into_iter()
                .filter(|refill| names.contains(&refill.site.trim().to_lowercase()))
                .collect()
        }
        DataScope::Vehicles(_) | DataScope::Nothing => Vec::new(),
    }
}

pub fn filter_scans(scope: &DataScope, scans: Vec<ScanEvent>, sites: &[Site]) -> Vec<ScanEvent> {
    match scope {
        DataScope::All => scans,
        DataScope::Customer(_) | DataScope::Sites(_) => {
            let names = visible_site_names(scope, sites);
            let ids: HashSet<&str> = sites
                .iter()
                .filter(|site| names.contains(&site.name.trim().to_lowercase()))
                .map(|site| site.id.as_str())
                .collect();
            scans
                .into_iter()
                .filter(|scan| {
                    ids.contains(scan.site_ref.as_str())
                        || names.contains(&scan.site_name.trim().to_lowercase())
                })
                .collect()
        }
        DataScope::Vehicles(vehicle_ids) => scans
            .into_iter()
            .filter(|scan| vehicle_ids.contains(&scan.vehicle_ref))
            .collect(),
        DataScope::Nothing => Vec::new(),
    }
}

pub fn filter_devices(scope: &DataScope, devices: Vec<Device>, sites: &[Site]) -> Vec<Device> {
    match scope {
        DataScope::All => devices,
        DataScope::Customer(_) | DataScope::Sites(_) => {
            let names = visible_site_names(scope, sites);
            devices
                .into_iter()
                .filter(|device| names.contains(&device.site_name.trim().to_lowercase()))
                .collect()
        }
        DataScope::Vehicles(_) | DataScope::Nothing => Vec::new(),
    }
}

/// Records for vehicles in `visible` only, unless the scope is unrestricted.
pub fn filter_maintenance(
    scope: &DataScope,
    records: Vec<MaintenanceRecord>,
    visible: &[Vehicle],
) -> Vec<MaintenanceRecord> {
    if *scope == DataScope::All {
        return records;
    }
    let ids: HashSet<&str> = visible.iter().map(|vehicle| vehicle.id.as_str()).collect();
    records
        .into_iter()
        .filter(|record| ids.contains(record.vehicle_id.as_str()))
        .collect()
}

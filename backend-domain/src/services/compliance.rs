use std::collections::HashMap;

use crate::entities::{ComplianceRating, ComplianceSummary, ScanEvent, SiteWashCount, Vehicle};

const SITE_RANKING_LIMIT: usize = 10;

impl ComplianceRating {
    pub fn from_rate(rate: u32) -> Self {
        if rate >= 75 {
            ComplianceRating::Good
        } else if rate >= 50 {
            ComplianceRating::Warning
        } else {
            ComplianceRating::Critical
        }
    }
}

pub fn summarize_compliance(vehicles: &[Vehicle], scans: &[ScanEvent]) -> ComplianceSummary {
    let total_vehicles = vehicles.len();
    let compliant_vehicles = vehicles.iter().filter(|vehicle| vehicle.is_compliant()).count();
    let compliance_rate = if total_vehicles > 0 {
        (compliant_vehicles as f64 * 100.0 / total_vehicles as f64).round() as u32
    } else {
        0
    };

    let mut counts: HashMap<&str, usize> = HashMap::new();
    for scan in scans {
        let site = if scan.site_name.trim().is_empty() {
            scan.site_ref.as_str()
        } else {
            scan.site_name.as_str()
        };
        *counts.entry(site).or_default() += 1;
    }
    let mut washes_by_site: Vec<SiteWashCount> = counts
        .into_iter()
        .map(|(site, washes)| SiteWashCount {
            site: site.to_string(),
            washes,
        })
        .collect();
    washes_by_site.sort_by(|a, b| b.washes.cmp(&a.washes).then_with(|| a.site.cmp(&b.site)));
    washes_by_site.truncate(SITE_RANKING_LIMIT);

    ComplianceSummary {
        total_vehicles,
        compliant_vehicles,
        non_compliant_vehicles: total_vehicles - compliant_vehicles,
        compliance_rate,
        rating: ComplianceRating::from_rate(compliance_rate),
        total_washes: vehicles.iter().map(|vehicle| vehicle.washes_completed).sum(),
        washes_by_site,
    }
}

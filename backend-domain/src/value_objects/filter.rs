// Vendor query filter value object

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Customer/site/date-range filter shared by the vendor endpoints.
/// `None` means "no filter"; the UI sentinel `all` never survives construction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VendorFilter {
    pub customer: Option<String>,
    pub site: Option<String>,
    pub from_date: Option<NaiveDate>,
    pub to_date: Option<NaiveDate>,
}

impl VendorFilter {
    pub fn new(
        customer: Option<String>,
        site: Option<String>,
        from_date: Option<NaiveDate>,
        to_date: Option<NaiveDate>,
    ) -> Self {
        Self {
            customer: normalize_scope(customer),
            site: normalize_scope(site),
            from_date,
            to_date,
        }
    }

    pub fn customer(customer: Option<String>) -> Self {
        Self::new(customer, None, None, None)
    }
}

/// Query string accepted by the fleet read endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FleetQuery {
    pub customer: Option<String>,
    pub site: Option<String>,
    pub from_date: Option<NaiveDate>,
    pub to_date: Option<NaiveDate>,
}

impl FleetQuery {
    pub fn to_filter(&self) -> VendorFilter {
        VendorFilter::new(
            self.customer.clone(),
            self.site.clone(),
            self.from_date,
            self.to_date,
        )
    }
}

pub fn normalize_scope(value: Option<String>) -> Option<String> {
    value.and_then(|raw| {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("all") {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_sentinel_and_blank_mean_no_filter() {
        let filter = VendorFilter::new(
            Some("all".to_string()),
            Some("  ".to_string()),
            None,
            None,
        );
        assert_eq!(filter.customer, None);
        assert_eq!(filter.site, None);

        let filter = VendorFilter::new(Some(" ALL ".to_string()), Some("S-12".to_string()), None, None);
        assert_eq!(filter.customer, None);
        assert_eq!(filter.site.as_deref(), Some("S-12"));
    }
}

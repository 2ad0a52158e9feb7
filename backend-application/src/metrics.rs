use std::sync::atomic::{AtomicU64, Ordering};

use backend_domain::DispatchResults;

#[derive(Debug, Default)]
pub struct Metrics {
    refill_analyses: AtomicU64,
    compliance_queries: AtomicU64,
    maintenance_queries: AtomicU64,
    vendor_errors: AtomicU64,
    dispatch_runs: AtomicU64,
    reports_sent: AtomicU64,
    reports_skipped: AtomicU64,
    reports_failed: AtomicU64,
    user_info_failures: AtomicU64,
}

impl Metrics {
    pub fn record_refill_analysis(&self) {
        self.refill_analyses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_compliance_query(&self) {
        self.compliance_queries.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_maintenance_query(&self) {
        self.maintenance_queries.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_vendor_error(&self) {
        self.vendor_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_user_info_failure(&self) {
        self.user_info_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_report_sent(&self) {
        self.reports_sent.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_dispatch(&self, results: &DispatchResults) {
        self.dispatch_runs.fetch_add(1, Ordering::Relaxed);
        self.reports_sent
            .fetch_add(results.sent as u64, Ordering::Relaxed);
        self.reports_skipped
            .fetch_add(results.skipped as u64, Ordering::Relaxed);
        self.reports_failed
            .fetch_add(results.failed as u64, Ordering::Relaxed);
    }

    pub fn render_prometheus(&self) -> String {
        let analyses = self.refill_analyses.load(Ordering::Relaxed);
        let compliance = self.compliance_queries.load(Ordering::Relaxed);
        let maintenance = self.maintenance_queries.load(Ordering::Relaxed);
        let vendor_errors = self.vendor_errors.load(Ordering::Relaxed);
        let user_info_failures = self.user_info_failures.load(Ordering::Relaxed);
        let runs = self.dispatch_runs.load(Ordering::Relaxed);
        let sent = self.reports_sent.load(Ordering::Relaxed);
        let skipped = self.reports_skipped.load(Ordering::Relaxed);
        let failed = self.reports_failed.load(Ordering::Relaxed);

        format!(
            "# TYPE fleetwash_refill_analyses_total counter\n\
fleetwash_refill_analyses_total {}\n\
# TYPE fleetwash_compliance_queries_total counter\n\
fleetwash_compliance_queries_total {}\n\
# TYPE fleetwash_maintenance_queries_total counter\n\
fleetwash_maintenance_queries_total {}\n\
# TYPE fleetwash_vendor_errors_total counter\n\
fleetwash_vendor_errors_total {}\n\
# TYPE fleetwash_user_info_failures_total counter\n\
fleetwash_user_info_failures_total {}\n\
# TYPE fleetwash_dispatch_runs_total counter\n\
fleetwash_dispatch_runs_total {}\n\
# TYPE fleetwash_reports_sent_total counter\n\
fleetwash_reports_sent_total {}\n\
# TYPE fleetwash_reports_skipped_total counter\n\
fleetwash_reports_skipped_total {}\n\
# TYPE fleetwash_reports_failed_total counter\n\
fleetwash_reports_failed_total {}\n",
            analyses,
            compliance,
            maintenance,
            vendor_errors,
            user_info_failures,
            runs,
            sent,
            skipped,
            failed
        )
    }
}

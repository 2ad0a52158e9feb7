// Queries read vendor and platform data

pub mod compliance_queries;
pub mod email_report_queries;
pub mod maintenance_queries;
pub mod refill_analysis_queries;
pub mod user_queries;

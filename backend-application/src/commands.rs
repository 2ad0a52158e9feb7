// Commands mutate platform state

pub mod email_report_commands;
pub mod maintenance_commands;
pub mod report_dispatch_commands;

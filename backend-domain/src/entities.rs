// Domain entities
pub mod config;
pub mod email_report;
pub mod fleet;
pub mod maintenance;
pub mod prediction;
pub mod refill;
pub mod scan;
pub mod user;

pub use config::*;
pub use email_report::*;
pub use fleet::*;
pub use maintenance::*;
pub use prediction::*;
pub use refill::*;
pub use scan::*;
pub use user::*;

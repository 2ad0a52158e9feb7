pub mod fleet_handlers;
pub mod maintenance_handlers;
pub mod ops_handlers;
pub mod report_handlers;
pub mod user_handlers;

pub use fleet_handlers::*;
pub use maintenance_handlers::*;
pub use ops_handlers::*;
pub use report_handlers::*;
pub use user_handlers::*;

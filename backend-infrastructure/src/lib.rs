pub mod clients;
pub mod config;
pub mod repositories;
pub mod services;

pub use clients::*;
pub use config::*;
pub use repositories::*;
pub use services::*;

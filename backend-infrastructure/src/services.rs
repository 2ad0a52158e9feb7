pub mod dispatch_service;
pub mod health_service;

pub use dispatch_service::*;
pub use health_service::*;

// Domain services
// Pure computations over entities, no I/O

pub mod compliance;
pub mod fleet_health;
pub mod forecast;
pub mod permissions;
pub mod schedule;

pub use compliance::*;
pub use fleet_health::*;
pub use forecast::*;
pub use permissions::*;
pub use schedule::*;

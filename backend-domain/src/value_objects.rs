// Domain value objects
pub mod filter;
pub mod frequency;
pub mod role;
pub mod trend;
pub mod urgency;

pub use filter::*;
pub use frequency::*;
pub use role::*;
pub use trend::*;
pub use urgency::*;

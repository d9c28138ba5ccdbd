pub mod fixtures;
pub mod transports;

pub use fixtures::*;
pub use transports::*;

//! Safe SQL builder: identifiers are fixed or whitelisted, values are parameters.

mod builder;
pub mod params;
pub use builder::*;
pub use params::*;

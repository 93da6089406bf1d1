//! Route tables.

mod common;
mod object;

pub use common::common_routes;
pub use object::{object_routes, OBJECTS_PATH};

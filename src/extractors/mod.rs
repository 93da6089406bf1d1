//! Request extractors that reject with the JSON error envelope.

mod body;
mod path;
mod query;

pub use body::{JsonBody, CANT_PARSE_BODY};
pub use path::ObjectId;
pub use query::ListQuery;

//! Request parameter pipeline and the object service.

mod object;
pub mod pipeline;
pub mod transform;
pub mod validation;

pub use object::ObjectService;
pub use pipeline::ParamPipeline;
pub use transform::{Transform, TransformError, Transformer};
pub use validation::{Validate, Validator, Violation};

//! Transform-then-validate pipeline run on every request parameter struct.

use crate::error::ApiError;
use crate::service::transform::{Transform, Transformer};
use crate::service::validation::{Validate, Validator};

/// Built once at startup and shared read-only through `AppState`.
#[derive(Default)]
pub struct ParamPipeline {
    transformer: Transformer,
    validator: Validator,
}

impl ParamPipeline {
    pub fn new(transformer: Transformer, validator: Validator) -> Self {
        Self {
            transformer,
            validator,
        }
    }

    /// Normalize `params` in place, then validate it.
    ///
    /// A transform failure is a declaration bug and surfaces as an unexpected
    /// 500. A validation failure is the 400 for the first violated rule.
    pub fn prepare<T>(&self, params: &mut T) -> Result<(), ApiError>
    where
        T: Transform + Validate,
    {
        let type_name = params.type_name();
        self.transformer
            .apply(params, type_name)
            .map_err(ApiError::unexpected)?;
        self.validator.validate(&*params)?;
        Ok(())
    }

    pub fn validator(&self) -> &Validator {
        &self.validator
    }
}

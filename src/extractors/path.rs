//! Object id from the `:id` path segment.

use crate::error::{ApiError, HttpError};
use async_trait::async_trait;
use axum::{
    extract::{FromRequestParts, Path},
    http::request::Parts,
};
use uuid::Uuid;

/// A path id that is not a UUID cannot name an object, so it is a 404.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ObjectId(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for ObjectId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|e| HttpError::not_found("not found").with_cause(e))?;
        let id = Uuid::parse_str(raw.trim())
            .map_err(|e| HttpError::not_found("not found").with_cause(e))?;
        Ok(ObjectId(id))
    }
}

//! JSON request body.

use crate::error::{ApiError, HttpError};
use async_trait::async_trait;
use axum::{
    body::Bytes,
    extract::{FromRequest, Request},
    http::StatusCode,
};
use serde::de::DeserializeOwned;

pub const CANT_PARSE_BODY: &str = "can't parse body";

/// Like `axum::Json`, but read and decode failures are a 400 "can't parse
/// body" envelope (413 when the body exceeds the size limit) and the content
/// type is not checked.
#[derive(Debug)]
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for JsonBody<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Send,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state).await.map_err(|e| {
            if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
                HttpError::new(e.status(), "").with_cause(e)
            } else {
                HttpError::bad_request(CANT_PARSE_BODY).with_cause(e)
            }
        })?;
        let value = serde_json::from_slice(&bytes)
            .map_err(|e| HttpError::bad_request(CANT_PARSE_BODY).with_cause(e))?;
        Ok(JsonBody(value))
    }
}

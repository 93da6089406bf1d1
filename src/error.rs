//! Typed errors and HTTP mapping.
//!
//! [`HttpError`] is the client-facing error: a status code, a description and
//! an optional cause that is logged but never serialized. [`ApiError`] is what
//! handlers return; it is either a `HttpError` or an unexpected error that is
//! rendered as a generic 500 and forwarded to telemetry.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Serialize, Serializer};
use std::error::Error as StdError;
use std::fmt;
use thiserror::Error;

/// Boxed error usable as a cause or an unexpected failure.
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Result type for handlers.
pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required setting: {0}")]
    Missing(&'static str),
    #[error("invalid value for {key}: '{value}'")]
    Invalid { key: &'static str, value: String },
}

/// REST error: `{"code": <int>, "description": <string>}` on the wire.
#[derive(Debug, Serialize)]
pub struct HttpError {
    #[serde(serialize_with = "serialize_status")]
    code: StatusCode,
    description: String,
    #[serde(skip)]
    cause: Option<BoxError>,
}

fn serialize_status<S: Serializer>(code: &StatusCode, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u16(code.as_u16())
}

impl HttpError {
    /// An empty description is replaced with the status' canonical reason.
    pub fn new(code: StatusCode, description: impl Into<String>) -> Self {
        let mut description = description.into();
        if description.is_empty() {
            description = code.canonical_reason().unwrap_or("Unknown Error").to_string();
        }
        Self {
            code,
            description,
            cause: None,
        }
    }

    pub fn bad_request(description: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, description)
    }

    pub fn unauthorized(description: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, description)
    }

    pub fn forbidden(description: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, description)
    }

    pub fn not_found(description: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, description)
    }

    pub fn conflict(description: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, description)
    }

    pub fn internal(description: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, description)
    }

    /// Attach the underlying error. It is logged and reported, never sent to the client.
    pub fn with_cause(mut self, cause: impl Into<BoxError>) -> Self {
        self.cause = Some(cause.into());
        self
    }

    pub fn code(&self) -> StatusCode {
        self.code
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn cause(&self) -> Option<&(dyn StdError + Send + Sync + 'static)> {
        self.cause.as_deref()
    }

    pub fn has_status(&self, code: StatusCode) -> bool {
        self.code == code
    }

    pub fn is_bad_request(&self) -> bool {
        self.has_status(StatusCode::BAD_REQUEST)
    }

    pub fn is_unauthorized(&self) -> bool {
        self.has_status(StatusCode::UNAUTHORIZED)
    }

    pub fn is_forbidden(&self) -> bool {
        self.has_status(StatusCode::FORBIDDEN)
    }

    pub fn is_not_found(&self) -> bool {
        self.has_status(StatusCode::NOT_FOUND)
    }

    pub fn is_conflict(&self) -> bool {
        self.has_status(StatusCode::CONFLICT)
    }

    pub fn is_client_error(&self) -> bool {
        self.code.is_client_error()
    }
}

impl fmt::Display for HttpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.as_u16(), self.description)
    }
}

impl StdError for HttpError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.cause.as_deref().map(|e| e as &(dyn StdError + 'static))
    }
}

/// Error returned by handlers and rendered by [`crate::response::write_error`].
#[derive(Debug)]
pub enum ApiError {
    /// A taxonomy error that carries its own status code.
    Http(HttpError),
    /// Anything else. Always answered with a generic 500.
    Unexpected(BoxError),
}

impl ApiError {
    pub fn unexpected(err: impl Into<BoxError>) -> Self {
        ApiError::Unexpected(err.into())
    }

    /// The `HttpError` this error is or wraps, searching the source chain of
    /// unexpected errors.
    pub fn http_error(&self) -> Option<&HttpError> {
        match self {
            ApiError::Http(e) => Some(e),
            ApiError::Unexpected(e) => find_http_error(e.as_ref()),
        }
    }

    pub fn is_unexpected(&self) -> bool {
        self.http_error().is_none()
    }

    pub fn is_not_found(&self) -> bool {
        self.http_error().is_some_and(HttpError::is_not_found)
    }

    pub fn is_bad_request(&self) -> bool {
        self.http_error().is_some_and(HttpError::is_bad_request)
    }

    /// Status the client will see.
    pub fn status(&self) -> StatusCode {
        self.http_error()
            .map(HttpError::code)
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

fn find_http_error<'a>(err: &'a (dyn StdError + Send + Sync + 'static)) -> Option<&'a HttpError> {
    let root: &'a (dyn StdError + 'static) = err;
    let mut current = Some(root);
    while let Some(e) = current {
        if let Some(http) = e.downcast_ref::<HttpError>() {
            return Some(http);
        }
        current = e.source();
    }
    None
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Http(e) => e.fmt(f),
            ApiError::Unexpected(e) => e.fmt(f),
        }
    }
}

impl StdError for ApiError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            ApiError::Http(e) => e.source(),
            ApiError::Unexpected(e) => Some(e.as_ref()),
        }
    }
}

impl From<HttpError> for ApiError {
    fn from(e: HttpError) -> Self {
        ApiError::Http(e)
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(e: sqlx::Error) -> Self {
        ApiError::Unexpected(Box::new(e))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        crate::response::write_error(self)
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        crate::response::write_error(ApiError::Http(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Error)]
    #[error("lookup failed")]
    struct Wrapper(#[source] HttpError);

    #[test]
    fn display_renders_code_and_description() {
        let err = HttpError::new(StatusCode::IM_A_TEAPOT, "I'm a teapot");
        assert_eq!(err.to_string(), "418: I'm a teapot");
    }

    #[test]
    fn serializes_without_cause() {
        let err = HttpError::not_found("Object not found").with_cause(std::io::Error::other("no rows"));
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json, serde_json::json!({"code": 404, "description": "Object not found"}));
        assert_eq!(err.cause().unwrap().to_string(), "no rows");
    }

    #[test]
    fn empty_description_falls_back_to_reason() {
        let err = HttpError::conflict("");
        assert_eq!(err.description(), "Conflict");
    }

    #[test]
    fn constructors_classify_by_status() {
        assert!(HttpError::bad_request("x").is_bad_request());
        assert!(HttpError::unauthorized("x").is_unauthorized());
        assert!(HttpError::forbidden("x").is_forbidden());
        assert!(HttpError::not_found("x").is_not_found());
        assert!(HttpError::conflict("x").is_conflict());
        assert_eq!(HttpError::internal("x").code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!HttpError::internal("x").is_client_error());
    }

    #[test]
    fn finds_wrapped_http_error() {
        let err = ApiError::unexpected(Wrapper(HttpError::forbidden("no access")));
        assert!(!err.is_unexpected());
        assert_eq!(err.status(), StatusCode::FORBIDDEN);

        let plain = ApiError::unexpected(std::io::Error::other("boom"));
        assert!(plain.is_unexpected());
        assert_eq!(plain.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}

//! JSON response writers used for both success and error paths.

use crate::error::{ApiError, ApiResult, BoxError, HttpError};
use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

pub const CONTENT_TYPE_JSON: &str = "application/json";

/// Description sent for every error that is not a [`HttpError`].
pub const INTERNAL_SERVER_ERROR: &str = "Internal Server Error";

#[derive(Serialize)]
struct ErrorBody<'a> {
    code: u16,
    description: &'a str,
}

/// An unexpected handler error, attached to the 500 response so the
/// telemetry middleware can report it with the request context.
#[derive(Clone)]
pub struct UnexpectedError(Arc<dyn StdError + Send + Sync + 'static>);

impl UnexpectedError {
    pub fn new(err: BoxError) -> Self {
        Self(Arc::from(err))
    }

    pub fn error(&self) -> &(dyn StdError + Send + Sync + 'static) {
        self.0.as_ref()
    }
}

impl fmt::Debug for UnexpectedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("UnexpectedError").field(&self.0).finish()
    }
}

impl fmt::Display for UnexpectedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// 200 with `value` as JSON.
pub fn write_ok<T: Serialize>(value: &T) -> ApiResult<Response> {
    write_json(value, StatusCode::OK)
}

/// `value` as JSON with the given status. Encoding failures become an unexpected error.
pub fn write_json<T: Serialize>(value: &T, status: StatusCode) -> ApiResult<Response> {
    let body = serde_json::to_vec(value).map_err(|e| {
        ApiError::unexpected(format!("can't encode {} in JSON: {}", std::any::type_name::<T>(), e))
    })?;
    Ok(json_response(status, body))
}

pub fn write_no_content() -> ApiResult<Response> {
    Ok(StatusCode::NO_CONTENT.into_response())
}

fn json_response(status: StatusCode, body: Vec<u8>) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, HeaderValue::from_static(CONTENT_TYPE_JSON))],
        body,
    )
        .into_response()
}

/// Log `err` and render it as the error envelope.
///
/// A `HttpError` (direct or wrapped) is written verbatim. Anything else is
/// answered with a generic 500 and attached to the response as
/// [`UnexpectedError`]; its message never reaches the client.
pub fn write_error(err: ApiError) -> Response {
    if let Some(http) = err.http_error() {
        log_http_error(http);
        return encode_error(http.code(), http.description());
    }

    tracing::error!(error = %err, "{}: {}", StatusCode::INTERNAL_SERVER_ERROR.as_u16(), INTERNAL_SERVER_ERROR);
    let mut response = encode_error(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_SERVER_ERROR);
    if let ApiError::Unexpected(e) = err {
        response.extensions_mut().insert(UnexpectedError::new(e));
    }
    response
}

fn log_http_error(err: &HttpError) {
    match (err.code().is_server_error(), err.cause()) {
        (true, Some(cause)) => tracing::error!(cause = %cause, "{}", err),
        (true, None) => tracing::error!("{}", err),
        (false, Some(cause)) => tracing::warn!(cause = %cause, "{}", err),
        (false, None) => tracing::warn!("{}", err),
    }
}

fn encode_error(code: StatusCode, description: &str) -> Response {
    match serde_json::to_vec(&ErrorBody {
        code: code.as_u16(),
        description,
    }) {
        Ok(body) => json_response(code, body),
        Err(e) => {
            tracing::error!(error = %e, "can't encode error response");
            code.into_response()
        }
    }
}

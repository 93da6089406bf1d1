//! Error responses produced below the handlers (timeouts, body limits) get
//! the JSON error envelope.

use crate::error::HttpError;
use crate::response::{write_error, CONTENT_TYPE_JSON};
use axum::{
    extract::Request,
    http::header,
    middleware::Next,
    response::Response,
};

pub async fn ensure_envelope(request: Request, next: Next) -> Response {
    into_envelope(next.run(request).await)
}

/// Rewrite any 4xx/5xx response that is not JSON into `{code, description}`,
/// keeping its status and non-body headers (e.g. `Allow`).
pub fn into_envelope(response: Response) -> Response {
    let status = response.status();
    if !(status.is_client_error() || status.is_server_error()) || is_json(&response) {
        return response;
    }
    let (parts, _) = response.into_parts();
    let mut rewritten = write_error(HttpError::new(status, "").into());
    for (name, value) in parts.headers.iter() {
        if name == header::CONTENT_TYPE || name == header::CONTENT_LENGTH {
            continue;
        }
        rewritten.headers_mut().entry(name.clone()).or_insert(value.clone());
    }
    rewritten
}

fn is_json(response: &Response) -> bool {
    response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with(CONTENT_TYPE_JSON))
}

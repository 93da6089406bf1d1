//! Per-request telemetry context.

use crate::middleware::recover::panic_message;
use crate::response::UnexpectedError;
use crate::telemetry::{ErrorCapture, Telemetry};
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use futures::FutureExt;
use std::panic::AssertUnwindSafe;

/// Reports unexpected errors (the [`UnexpectedError`] response extension)
/// and panics, and flushes reports before the response is released. Panics
/// are re-raised for the recovery layer.
pub async fn capture_errors(
    State(telemetry): State<Telemetry>,
    request: Request,
    next: Next,
) -> Response {
    let capture = telemetry.capture_for(request.method().as_str(), &request.uri().to_string());

    match AssertUnwindSafe(next.run(request)).catch_unwind().await {
        Ok(response) => {
            if let Some(err) = response.extensions().get::<UnexpectedError>() {
                capture.capture(err.error());
            }
            flush(&capture, &telemetry).await;
            response
        }
        Err(payload) => {
            capture.capture_panic(panic_message(payload.as_ref()));
            flush(&capture, &telemetry).await;
            std::panic::resume_unwind(payload)
        }
    }
}

async fn flush(capture: &ErrorCapture, telemetry: &Telemetry) {
    if !capture.flush(telemetry.flush_timeout()).await {
        tracing::warn!(timeout = ?telemetry.flush_timeout(), "telemetry flush timed out");
    }
}

//! Request logging built on `tower_http::trace`.

use axum::http::{Request, Response};
use chrono::{SecondsFormat, Utc};
use std::time::Duration;
use tower_http::classify::{ServerErrorsAsFailures, SharedClassifier};
use tower_http::trace::{DefaultOnRequest, MakeSpan, OnResponse, TraceLayer};
use tracing::Span;

pub type LoggerLayer =
    TraceLayer<SharedClassifier<ServerErrorsAsFailures>, RequestSpan, DefaultOnRequest, RequestCompletion>;

pub fn layer() -> LoggerLayer {
    TraceLayer::new_for_http()
        .make_span_with(RequestSpan)
        .on_response(RequestCompletion)
}

/// Span carrying method, URI and the time the request arrived.
#[derive(Clone, Copy, Debug, Default)]
pub struct RequestSpan;

impl<B> MakeSpan<B> for RequestSpan {
    fn make_span(&mut self, request: &Request<B>) -> Span {
        tracing::info_span!(
            "request",
            method = %request.method(),
            uri = %request.uri(),
            "@timestamp" = %Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
        )
    }
}

/// Logs status and elapsed milliseconds once the response is produced.
#[derive(Clone, Copy, Debug, Default)]
pub struct RequestCompletion;

impl<B> OnResponse<B> for RequestCompletion {
    fn on_response(self, response: &Response<B>, latency: Duration, _span: &Span) {
        let status = response.status();
        let elapsed_ms = u64::try_from(latency.as_millis()).unwrap_or(u64::MAX);
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), elapsed_ms, "request completed");
        } else if status.is_client_error() {
            tracing::warn!(status = status.as_u16(), elapsed_ms, "request completed");
        } else {
            tracing::info!(status = status.as_u16(), elapsed_ms, "request completed");
        }
    }
}

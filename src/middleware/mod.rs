//! HTTP middleware chain: request logging, panic recovery, error envelope,
//! body limit, timeout and error telemetry.

pub mod envelope;
pub mod logger;
pub mod recover;
pub mod telemetry;

use crate::telemetry::Telemetry;
use axum::Router;
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{limit::RequestBodyLimitLayer, timeout::TimeoutLayer};

pub const DEFAULT_BODY_LIMIT: usize = 1024 * 1024;

/// Per-request bounds enforced by the chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpLimits {
    pub request_timeout: Duration,
    /// Maximum request body size in bytes.
    pub body_limit: usize,
}

impl Default for HttpLimits {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(60),
            body_limit: DEFAULT_BODY_LIMIT,
        }
    }
}

/// Wrap `router` so that, outermost first, requests pass the logger, panic
/// recovery, the error envelope, the body limit, the timeout and the
/// telemetry context. Layers that change the body type are applied one
/// `Router::layer` at a time.
pub fn apply(router: Router, reporting: Telemetry, limits: HttpLimits) -> Router {
    router
        .layer(axum::middleware::from_fn_with_state(
            reporting,
            telemetry::capture_errors,
        ))
        .layer(TimeoutLayer::new(limits.request_timeout))
        .layer(RequestBodyLimitLayer::new(limits.body_limit))
        .layer(axum::middleware::from_fn(envelope::ensure_envelope))
        .layer(
            ServiceBuilder::new()
                .layer(logger::layer())
                .layer(recover::layer()),
        )
}

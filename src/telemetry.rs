//! Error reporting to an external collector.
//!
//! The telemetry middleware creates an [`ErrorCapture`] per request, bound to
//! its method and URI.
//! Captured errors are sent in the background and awaited, within the
//! configured flush timeout, before the response leaves the middleware.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::error::Error as StdError;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use thiserror::Error;
use tokio::task::JoinHandle;

/// One reported failure with its request context.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ErrorEvent {
    pub message: String,
    /// Messages of the error's sources, outermost first.
    pub causes: Vec<String>,
    pub environment: String,
    pub method: String,
    pub uri: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("can't send error report: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("collector answered {0}")]
    Rejected(reqwest::StatusCode),
}

#[async_trait]
pub trait ErrorReporter: Send + Sync {
    async fn report(&self, event: ErrorEvent) -> Result<(), ReportError>;
}

/// POSTs each event as JSON to the collector DSN.
pub struct CollectorReporter {
    client: reqwest::Client,
    dsn: String,
}

impl CollectorReporter {
    pub fn new(dsn: impl Into<String>, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_default();
        Self {
            client,
            dsn: dsn.into(),
        }
    }
}

#[async_trait]
impl ErrorReporter for CollectorReporter {
    async fn report(&self, event: ErrorEvent) -> Result<(), ReportError> {
        let response = self.client.post(&self.dsn).json(&event).send().await?;
        if !response.status().is_success() {
            return Err(ReportError::Rejected(response.status()));
        }
        Ok(())
    }
}

/// Process-wide telemetry settings, built once in `main`.
#[derive(Clone)]
pub struct Telemetry {
    reporter: Option<Arc<dyn ErrorReporter>>,
    environment: String,
    flush_timeout: Duration,
}

impl Telemetry {
    pub fn new(
        reporter: Option<Arc<dyn ErrorReporter>>,
        environment: impl Into<String>,
        flush_timeout: Duration,
    ) -> Self {
        Self {
            reporter,
            environment: environment.into(),
            flush_timeout,
        }
    }

    /// Errors are only logged.
    pub fn disabled() -> Self {
        Self::new(None, "development", Duration::from_secs(5))
    }

    pub fn is_enabled(&self) -> bool {
        self.reporter.is_some()
    }

    pub fn flush_timeout(&self) -> Duration {
        self.flush_timeout
    }

    pub fn capture_for(&self, method: &str, uri: &str) -> ErrorCapture {
        ErrorCapture {
            reporter: self.reporter.clone(),
            environment: self.environment.clone(),
            method: method.to_string(),
            uri: uri.to_string(),
            pending: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

/// Per-request reporting handle bound to the method and URI.
#[derive(Clone)]
pub struct ErrorCapture {
    reporter: Option<Arc<dyn ErrorReporter>>,
    environment: String,
    method: String,
    uri: String,
    pending: Arc<Mutex<Vec<JoinHandle<()>>>>,
}

impl ErrorCapture {
    pub fn event(&self, err: &(dyn StdError + 'static)) -> ErrorEvent {
        let mut causes = Vec::new();
        let mut source = err.source();
        while let Some(e) = source {
            causes.push(e.to_string());
            source = e.source();
        }
        self.event_with(err.to_string(), causes)
    }

    fn event_with(&self, message: String, causes: Vec<String>) -> ErrorEvent {
        ErrorEvent {
            message,
            causes,
            environment: self.environment.clone(),
            method: self.method.clone(),
            uri: self.uri.clone(),
            timestamp: Utc::now(),
        }
    }

    /// Report `err` in the background.
    pub fn capture(&self, err: &(dyn StdError + 'static)) {
        self.send(self.event(err));
    }

    pub fn capture_panic(&self, message: &str) {
        self.send(self.event_with(format!("panic: {}", message), Vec::new()));
    }

    fn send(&self, event: ErrorEvent) {
        let Some(reporter) = self.reporter.clone() else {
            tracing::debug!(error = %event.message, "telemetry disabled, not reporting");
            return;
        };
        let handle = tokio::spawn(async move {
            if let Err(e) = reporter.report(event).await {
                tracing::warn!(error = %e, "error report dropped");
            }
        });
        self.pending
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(handle);
    }

    /// Wait for outstanding reports. Returns false when `timeout` elapsed first;
    /// unfinished reports keep running in the background.
    pub async fn flush(&self, timeout: Duration) -> bool {
        let handles: Vec<_> = self
            .pending
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .drain(..)
            .collect();
        if handles.is_empty() {
            return true;
        }
        tokio::time::timeout(timeout, futures::future::join_all(handles))
            .await
            .is_ok()
    }
}

//! REST scaffold: object CRUD over PostgreSQL with a uniform JSON error
//! envelope, a transform/validate parameter pipeline and error telemetry.

pub mod config;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod logging;
pub mod middleware;
pub mod migration;
pub mod models;
pub mod response;
pub mod routes;
pub mod service;
pub mod sql;
pub mod state;
pub mod store;
pub mod telemetry;

pub use config::AppConfig;
pub use error::{ApiError, ApiResult, ConfigError, HttpError};
pub use middleware::HttpLimits;
pub use migration::{ensure_database_exists, ensure_objects_table};
pub use response::{write_error, write_json, write_no_content, write_ok};
pub use routes::{common_routes, object_routes};
pub use state::AppState;
pub use store::{InMemoryObjectRepository, ObjectRepository, PgObjectRepository, StoreError};
pub use telemetry::{CollectorReporter, ErrorReporter, Telemetry};

use axum::{http::StatusCode, Router};

/// Full application router with the middleware chain applied.
pub fn app(state: AppState, telemetry: Telemetry, limits: HttpLimits) -> Router {
    let router = common_routes(state.clone())
        .merge(object_routes(state))
        .method_not_allowed_fallback(method_not_allowed)
        .fallback(not_found);
    middleware::apply(router, telemetry, limits)
}

async fn not_found() -> HttpError {
    HttpError::not_found("not found")
}

async fn method_not_allowed() -> HttpError {
    HttpError::new(StatusCode::METHOD_NOT_ALLOWED, "")
}

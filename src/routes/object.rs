//! Object CRUD routes.

use crate::handlers::object::{create, delete, get as read, list, update};
use crate::state::AppState;
use axum::{routing::get, Router};

pub const OBJECTS_PATH: &str = "/v1/objects";

pub fn object_routes(state: AppState) -> Router {
    Router::new()
        .route(OBJECTS_PATH, get(list).post(create))
        .route(&format!("{}/:id", OBJECTS_PATH), get(read).put(update).delete(delete))
        .with_state(state)
}

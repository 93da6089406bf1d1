//! Object CRUD handlers: list, get, create, update, delete.

use crate::error::{ApiError, ApiResult, HttpError};
use crate::extractors::{JsonBody, ListQuery, ObjectId};
use crate::models::{CreateObject, Object, UpdateObject};
use crate::response::write_ok;
use crate::state::AppState;
use crate::store::StoreError;
use axum::{extract::State, http::StatusCode, response::Response};

pub const OBJECT_NOT_FOUND: &str = "Object not found";
pub const DUPLICATE_OBJECT: &str = "duplicate Object";
pub const SUCCESSFULLY_DELETED: &str = "successfully deleted";

/// Repository sentinels become taxonomy errors; anything else is unexpected.
fn store_error(e: StoreError) -> ApiError {
    match e {
        StoreError::NotFound => HttpError::not_found(OBJECT_NOT_FOUND).with_cause(e).into(),
        StoreError::Duplicate => HttpError::bad_request(DUPLICATE_OBJECT).with_cause(e).into(),
        other => ApiError::unexpected(other),
    }
}

pub async fn list(State(state): State<AppState>, ListQuery(mut filter): ListQuery) -> ApiResult<Response> {
    state.pipeline.prepare(&mut filter)?;
    let objects = state
        .objects
        .list(&filter.pagination)
        .await
        .map_err(store_error)?;
    write_ok(&objects)
}

pub async fn get(State(state): State<AppState>, ObjectId(id): ObjectId) -> ApiResult<Response> {
    let object = state.objects.get(id).await.map_err(store_error)?;
    write_ok(&object)
}

pub async fn create(
    State(state): State<AppState>,
    JsonBody(mut body): JsonBody<CreateObject>,
) -> ApiResult<Response> {
    state.pipeline.prepare(&mut body)?;
    let created = state
        .objects
        .create(Object::from(body))
        .await
        .map_err(store_error)?;
    write_ok(&created)
}

pub async fn update(
    State(state): State<AppState>,
    ObjectId(id): ObjectId,
    JsonBody(mut body): JsonBody<UpdateObject>,
) -> ApiResult<Response> {
    state.pipeline.prepare(&mut body)?;
    let updated = state
        .objects
        .update(id, Object::from(body))
        .await
        .map_err(store_error)?;
    write_ok(&updated)
}

pub async fn delete(State(state): State<AppState>, ObjectId(id): ObjectId) -> ApiResult<Response> {
    state.objects.delete(id).await.map_err(store_error)?;
    write_ok(&HttpError::new(StatusCode::OK, SUCCESSFULLY_DELETED))
}

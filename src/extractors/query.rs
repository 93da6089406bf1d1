//! Pagination from the query string of `GET /objects`.

use crate::error::{ApiError, HttpError};
use crate::models::ListFilter;
use async_trait::async_trait;
use axum::{
    extract::{FromRequestParts, Query},
    http::request::Parts,
};
use std::collections::HashMap;

#[derive(Clone, Debug)]
pub struct ListQuery(pub ListFilter);

#[async_trait]
impl<S> FromRequestParts<S> for ListQuery
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(params) = Query::<HashMap<String, String>>::from_request_parts(parts, state)
            .await
            .map_err(|e| HttpError::bad_request("can't parse query").with_cause(e))?;
        Ok(ListQuery(ListFilter::from_query(&params)))
    }
}

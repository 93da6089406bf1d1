//! Object persistence: the repository contract and its implementations.

mod memory;
mod postgres;

pub use memory::InMemoryObjectRepository;
pub use postgres::PgObjectRepository;

use crate::models::{Object, ObjectList, Pagination};
use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("object not found")]
    NotFound,
    #[error("duplicate object")]
    Duplicate,
    #[error("database error: {0}")]
    Database(#[source] sqlx::Error),
    #[error("stored object is corrupted: {0}")]
    Corrupted(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::RowNotFound => StoreError::NotFound,
            sqlx::Error::Database(ref db) if db.is_unique_violation() => StoreError::Duplicate,
            sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) => StoreError::Corrupted(e.to_string()),
            other => StoreError::Database(other),
        }
    }
}

/// CRUD over objects. The store assigns ids and timestamps.
#[async_trait]
pub trait ObjectRepository: Send + Sync {
    /// One page plus the size of the whole collection.
    async fn list(&self, page: &Pagination) -> Result<ObjectList, StoreError>;

    async fn get(&self, id: Uuid) -> Result<Object, StoreError>;

    /// Insert `object`, ignoring its id and timestamps.
    async fn create(&self, object: Object) -> Result<Object, StoreError>;

    /// Overwrite the non-empty fields of `object` and stamp `updated_at`.
    async fn update(&self, id: Uuid, object: Object) -> Result<Object, StoreError>;

    async fn delete(&self, id: Uuid) -> Result<(), StoreError>;

    /// Liveness check used by `/ready`.
    async fn ping(&self) -> Result<(), StoreError>;
}

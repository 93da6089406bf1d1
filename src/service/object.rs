//! Object use cases over a repository.

use crate::models::{Object, ObjectList, Pagination};
use crate::store::{ObjectRepository, StoreError};
use std::sync::Arc;
use uuid::Uuid;

#[derive(Clone)]
pub struct ObjectService {
    repo: Arc<dyn ObjectRepository>,
}

impl ObjectService {
    pub fn new(repo: Arc<dyn ObjectRepository>) -> Self {
        Self { repo }
    }

    pub async fn list(&self, page: &Pagination) -> Result<ObjectList, StoreError> {
        self.repo.list(page).await
    }

    pub async fn get(&self, id: Uuid) -> Result<Object, StoreError> {
        self.repo.get(id).await
    }

    /// Server-managed fields supplied by the caller are discarded.
    pub async fn create(&self, mut object: Object) -> Result<Object, StoreError> {
        object.clear_server_fields();
        self.repo.create(object).await
    }

    pub async fn update(&self, id: Uuid, mut object: Object) -> Result<Object, StoreError> {
        object.id = id;
        object.clear_timestamps();
        self.repo.update(id, object).await
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        self.repo.delete(id).await
    }

    pub async fn ping(&self) -> Result<(), StoreError> {
        self.repo.ping().await
    }
}

//! In-process repository. Used by tests and for running without a database.

use super::{ObjectRepository, StoreError};
use crate::models::{Object, ObjectList, Pagination, SortOrder};
use async_trait::async_trait;
use chrono::Utc;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Clone, Default)]
pub struct InMemoryObjectRepository {
    objects: Arc<RwLock<HashMap<Uuid, Object>>>,
}

impl InMemoryObjectRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.objects.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.objects.read().await.is_empty()
    }
}

fn compare(a: &Object, b: &Object, sort_by: &str) -> Ordering {
    let primary = match sort_by {
        "id" => a.id.cmp(&b.id),
        "data" => a.data.cmp(&b.data),
        "updated_at" => a.updated_at.cmp(&b.updated_at),
        _ => a.created_at.cmp(&b.created_at),
    };
    primary.then_with(|| a.id.cmp(&b.id))
}

#[async_trait]
impl ObjectRepository for InMemoryObjectRepository {
    async fn list(&self, page: &Pagination) -> Result<ObjectList, StoreError> {
        let objects = self.objects.read().await;
        let mut all: Vec<&Object> = objects.values().collect();
        all.sort_by(|a, b| {
            let ord = compare(a, b, &page.sort_by);
            match page.order {
                SortOrder::Ascending => ord,
                SortOrder::Descending => ord.reverse(),
            }
        });
        let offset = usize::try_from(page.offset).unwrap_or(0);
        let limit = usize::try_from(page.limit).unwrap_or(0);
        let list: Vec<Object> = all.into_iter().skip(offset).take(limit).cloned().collect();
        Ok(ObjectList {
            count: list.len(),
            list,
            total: objects.len() as i64,
        })
    }

    async fn get(&self, id: Uuid) -> Result<Object, StoreError> {
        self.objects
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn create(&self, object: Object) -> Result<Object, StoreError> {
        let mut objects = self.objects.write().await;
        let id = Uuid::new_v4();
        if objects.contains_key(&id) {
            return Err(StoreError::Duplicate);
        }
        let now = Utc::now();
        let created = Object {
            id,
            data: object.data,
            created_at: Some(now),
            updated_at: Some(now),
        };
        objects.insert(id, created.clone());
        Ok(created)
    }

    async fn update(&self, id: Uuid, object: Object) -> Result<Object, StoreError> {
        let mut objects = self.objects.write().await;
        let stored = objects.get_mut(&id).ok_or(StoreError::NotFound)?;
        if !object.data.is_empty() {
            stored.data = object.data;
        }
        stored.updated_at = Some(Utc::now());
        Ok(stored.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        self.objects
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_data(data: &str) -> Object {
        Object {
            data: data.into(),
            ..Object::default()
        }
    }

    fn page(sort_by: &str, order: SortOrder, offset: i64, limit: i64) -> Pagination {
        Pagination {
            offset,
            limit,
            sort_by: sort_by.into(),
            order,
        }
    }

    #[tokio::test]
    async fn create_assigns_id_and_timestamps() {
        let repo = InMemoryObjectRepository::new();
        let mut input = with_data("x");
        input.id = Uuid::new_v4();
        let created = repo.create(input.clone()).await.unwrap();
        assert_ne!(created.id, input.id);
        assert!(!created.id.is_nil());
        assert!(created.created_at.is_some());
        assert_eq!(created.created_at, created.updated_at);
        assert_eq!(repo.get(created.id).await.unwrap(), created);
    }

    #[tokio::test]
    async fn update_keeps_empty_fields() {
        let repo = InMemoryObjectRepository::new();
        let created = repo.create(with_data("before")).await.unwrap();
        let updated = repo.update(created.id, Object::default()).await.unwrap();
        assert_eq!(updated.data, "before");
        assert!(updated.updated_at >= created.updated_at);
        assert_eq!(updated.created_at, created.created_at);

        let updated = repo.update(created.id, with_data("after")).await.unwrap();
        assert_eq!(updated.data, "after");
    }

    #[tokio::test]
    async fn missing_objects_are_not_found() {
        let repo = InMemoryObjectRepository::new();
        let id = Uuid::new_v4();
        assert!(matches!(repo.get(id).await, Err(StoreError::NotFound)));
        assert!(matches!(repo.update(id, with_data("x")).await, Err(StoreError::NotFound)));
        assert!(matches!(repo.delete(id).await, Err(StoreError::NotFound)));
    }

    #[tokio::test]
    async fn list_pages_in_requested_order() {
        let repo = InMemoryObjectRepository::new();
        for data in ["b", "c", "a"] {
            repo.create(with_data(data)).await.unwrap();
        }

        let asc = repo.list(&page("data", SortOrder::Ascending, 0, 2)).await.unwrap();
        let names: Vec<_> = asc.list.iter().map(|o| o.data.as_str()).collect();
        assert_eq!(names, ["a", "b"]);
        assert_eq!(asc.count, 2);
        assert_eq!(asc.total, 3);

        let desc = repo.list(&page("data", SortOrder::Descending, 1, 20)).await.unwrap();
        let names: Vec<_> = desc.list.iter().map(|o| o.data.as_str()).collect();
        assert_eq!(names, ["b", "a"]);
    }

    #[tokio::test]
    async fn delete_removes_object() {
        let repo = InMemoryObjectRepository::new();
        let created = repo.create(with_data("x")).await.unwrap();
        repo.delete(created.id).await.unwrap();
        assert!(repo.is_empty().await);
    }
}

//! PostgreSQL repository.

use super::{ObjectRepository, StoreError};
use crate::models::{Object, ObjectList, Pagination};
use crate::sql::{self, bind_all, QueryBuf};
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Clone)]
pub struct PgObjectRepository {
    pool: PgPool,
}

impl PgObjectRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn fetch_optional(&self, q: &QueryBuf) -> Result<Option<Object>, StoreError> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let row = bind_all(sqlx::query_as::<_, Object>(&q.sql), &q.params)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }
}

#[async_trait]
impl ObjectRepository for PgObjectRepository {
    async fn list(&self, page: &Pagination) -> Result<ObjectList, StoreError> {
        let q = sql::select_page(page);
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let list = bind_all(sqlx::query_as::<_, Object>(&q.sql), &q.params)
            .fetch_all(&self.pool)
            .await?;
        let (total,): (i64,) = sqlx::query_as(&sql::count_all()).fetch_one(&self.pool).await?;
        Ok(ObjectList {
            count: list.len(),
            list,
            total,
        })
    }

    async fn get(&self, id: Uuid) -> Result<Object, StoreError> {
        self.fetch_optional(&sql::select_by_id(id))
            .await?
            .ok_or(StoreError::NotFound)
    }

    async fn create(&self, object: Object) -> Result<Object, StoreError> {
        self.fetch_optional(&sql::insert(&object))
            .await?
            .ok_or_else(|| StoreError::Corrupted("insert returned no row".into()))
    }

    async fn update(&self, id: Uuid, object: Object) -> Result<Object, StoreError> {
        self.fetch_optional(&sql::update(id, &object))
            .await?
            .ok_or(StoreError::NotFound)
    }

    async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        let q = sql::delete(id);
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let deleted: Option<(Uuid,)> = bind_all(sqlx::query_as(&q.sql), &q.params)
            .fetch_optional(&self.pool)
            .await?;
        deleted.map(|_| ()).ok_or(StoreError::NotFound)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

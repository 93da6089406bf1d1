//! Builds parameterized SELECT, INSERT, UPDATE, DELETE for the objects table.

use super::params::PgBindValue;
use crate::models::{Object, Pagination, DEFAULT_SORT_BY, SORTABLE_COLUMNS};
use uuid::Uuid;

pub const OBJECTS_TABLE: &str = "objects";

const COLUMNS: &[&str] = &["id", "data", "created_at", "updated_at"];

/// Quote identifier for PostgreSQL.
pub fn quoted(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

#[derive(Debug, Default)]
pub struct QueryBuf {
    pub sql: String,
    pub params: Vec<PgBindValue>,
}

impl QueryBuf {
    fn new() -> Self {
        Self::default()
    }

    fn push_param(&mut self, v: impl Into<PgBindValue>) -> usize {
        self.params.push(v.into());
        self.params.len()
    }
}

fn column_list() -> String {
    COLUMNS.iter().map(|c| quoted(c)).collect::<Vec<_>>().join(", ")
}

/// Unknown sort columns fall back to creation time; the value is never interpolated raw.
fn sort_column(sort_by: &str) -> &str {
    SORTABLE_COLUMNS
        .iter()
        .copied()
        .find(|c| *c == sort_by)
        .unwrap_or(DEFAULT_SORT_BY)
}

/// One page ordered by the requested column. Ties are broken by id so pages are stable.
pub fn select_page(page: &Pagination) -> QueryBuf {
    let mut q = QueryBuf::new();
    let limit = q.push_param(page.limit);
    let offset = q.push_param(page.offset);
    let order = page.order.as_sql();
    q.sql = format!(
        "SELECT {} FROM {} ORDER BY {} {}, {} {} LIMIT ${} OFFSET ${}",
        column_list(),
        quoted(OBJECTS_TABLE),
        quoted(sort_column(&page.sort_by)),
        order,
        quoted("id"),
        order,
        limit,
        offset
    );
    q
}

pub fn count_all() -> String {
    format!("SELECT COUNT(*) FROM {}", quoted(OBJECTS_TABLE))
}

pub fn select_by_id(id: Uuid) -> QueryBuf {
    let mut q = QueryBuf::new();
    let n = q.push_param(id);
    q.sql = format!(
        "SELECT {} FROM {} WHERE {} = ${}",
        column_list(),
        quoted(OBJECTS_TABLE),
        quoted("id"),
        n
    );
    q
}

/// INSERT of the client-owned columns only; id and timestamps take their defaults.
pub fn insert(object: &Object) -> QueryBuf {
    let mut q = QueryBuf::new();
    let n = q.push_param(object.data.as_str());
    q.sql = format!(
        "INSERT INTO {} ({}) VALUES (${}) RETURNING {}",
        quoted(OBJECTS_TABLE),
        quoted("data"),
        n,
        column_list()
    );
    q
}

/// UPDATE by id: SET only non-empty fields, always stamping `updated_at`.
pub fn update(id: Uuid, object: &Object) -> QueryBuf {
    let mut q = QueryBuf::new();
    let mut sets = Vec::new();
    if !object.data.is_empty() {
        let n = q.push_param(object.data.as_str());
        sets.push(format!("{} = ${}", quoted("data"), n));
    }
    sets.push(format!("{} = NOW()", quoted("updated_at")));
    let id_param = q.push_param(id);
    q.sql = format!(
        "UPDATE {} SET {} WHERE {} = ${} RETURNING {}",
        quoted(OBJECTS_TABLE),
        sets.join(", "),
        quoted("id"),
        id_param,
        column_list()
    );
    q
}

/// DELETE by id, returning the deleted id so a missing row is detectable.
pub fn delete(id: Uuid) -> QueryBuf {
    let mut q = QueryBuf::new();
    let n = q.push_param(id);
    q.sql = format!(
        "DELETE FROM {} WHERE {} = ${} RETURNING {}",
        quoted(OBJECTS_TABLE),
        quoted("id"),
        n,
        quoted("id")
    );
    q
}

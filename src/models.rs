//! Resource entity, request bodies and list parameters.

use crate::service::transform::{FieldMods, Modifier, Transform};
use crate::service::validation::{Field, Rule, Validate};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

pub const DEFAULT_LIMIT: i64 = 20;
pub const MAX_LIMIT: i64 = 100;
pub const DEFAULT_SORT_BY: &str = "created_at";
pub const MAX_DATA_LENGTH: i64 = 4096;

/// Columns a list may be sorted by.
pub const SORTABLE_COLUMNS: &[&str] = &["id", "data", "created_at", "updated_at"];

/// The one resource exposed by the API. `id` and the timestamps are owned by
/// the store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Object {
    #[serde(default, skip_serializing_if = "Uuid::is_nil")]
    pub id: Uuid,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub data: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Object {
    /// Clear the timestamps so the store's defaults apply on write.
    pub fn clear_timestamps(&mut self) {
        self.created_at = None;
        self.updated_at = None;
    }

    /// Clear every server-managed field before insert.
    pub fn clear_server_fields(&mut self) {
        self.id = Uuid::nil();
        self.clear_timestamps();
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectList {
    #[serde(rename = "objects")]
    pub list: Vec<Object>,
    /// Items in this page.
    pub count: usize,
    /// Items in the whole collection.
    pub total: i64,
}

/// Body of `POST /objects`. Other fields sent by the client are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CreateObject {
    #[serde(default)]
    pub data: String,
}

impl Transform for CreateObject {
    fn modifiers(&mut self) -> Vec<FieldMods<'_>> {
        vec![FieldMods::str("data", &mut self.data, &[Modifier::Trim])]
    }
}

impl Validate for CreateObject {
    fn type_name(&self) -> &'static str {
        "CreateObject"
    }

    fn fields(&self) -> Vec<Field<'_>> {
        vec![Field::str("data", &self.data, &[Rule::Required, Rule::Max(MAX_DATA_LENGTH)])]
    }
}

impl From<CreateObject> for Object {
    fn from(c: CreateObject) -> Self {
        Object {
            data: c.data,
            ..Object::default()
        }
    }
}

/// Body of `PUT /objects/{id}`. Empty fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct UpdateObject {
    #[serde(default)]
    pub data: String,
}

impl Transform for UpdateObject {
    fn modifiers(&mut self) -> Vec<FieldMods<'_>> {
        vec![FieldMods::str("data", &mut self.data, &[Modifier::Trim])]
    }
}

impl Validate for UpdateObject {
    fn type_name(&self) -> &'static str {
        "UpdateObject"
    }

    fn fields(&self) -> Vec<Field<'_>> {
        vec![Field::str("data", &self.data, &[Rule::Max(MAX_DATA_LENGTH)])]
    }
}

impl From<UpdateObject> for Object {
    fn from(u: UpdateObject) -> Self {
        Object {
            data: u.data,
            ..Object::default()
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortOrder {
    #[default]
    #[serde(rename = "asc")]
    Ascending,
    #[serde(rename = "desc")]
    Descending,
}

impl SortOrder {
    /// Only the exact string `desc` selects descending order.
    pub fn parse(raw: &str) -> Self {
        if raw == "desc" {
            SortOrder::Descending
        } else {
            SortOrder::Ascending
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Ascending => "asc",
            SortOrder::Descending => "desc",
        }
    }

    pub fn as_sql(&self) -> &'static str {
        match self {
            SortOrder::Ascending => "ASC",
            SortOrder::Descending => "DESC",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub offset: i64,
    pub limit: i64,
    pub sort_by: String,
    pub order: SortOrder,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: DEFAULT_LIMIT,
            sort_by: String::new(),
            order: SortOrder::Ascending,
        }
    }
}

impl Pagination {
    /// Read `limit`, `offset`, `sortBy` and `order` from query parameters.
    /// Values are trimmed; absent or non-numeric numbers fall back to the defaults.
    pub fn from_query(params: &HashMap<String, String>) -> Self {
        let read = |key: &str| params.get(key).map(|v| v.trim()).unwrap_or("");
        Self {
            limit: read("limit").parse().unwrap_or(DEFAULT_LIMIT),
            offset: read("offset").parse().unwrap_or(0),
            sort_by: read("sortBy").to_string(),
            order: SortOrder::parse(read("order")),
        }
    }
}

/// Parameters of `GET /objects`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListFilter {
    pub pagination: Pagination,
}

impl ListFilter {
    /// Empty `sortBy` sorts by creation time.
    pub fn from_query(params: &HashMap<String, String>) -> Self {
        let mut pagination = Pagination::from_query(params);
        if pagination.sort_by.is_empty() {
            pagination.sort_by = DEFAULT_SORT_BY.to_string();
        }
        Self { pagination }
    }
}

impl Transform for ListFilter {
    fn modifiers(&mut self) -> Vec<FieldMods<'_>> {
        vec![FieldMods::str("sortBy", &mut self.pagination.sort_by, &[Modifier::Trim])]
    }
}

impl Validate for ListFilter {
    fn type_name(&self) -> &'static str {
        "ListFilter"
    }

    fn fields(&self) -> Vec<Field<'_>> {
        let p = &self.pagination;
        vec![
            Field::int("offset", p.offset, &[Rule::Min(0)]),
            Field::int("limit", p.limit, &[Rule::Min(0), Rule::Max(MAX_LIMIT)]),
            Field::str("sortBy", &p.sort_by, &[Rule::Required, Rule::OneOf(SORTABLE_COLUMNS)]),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::ParamPipeline;

    fn query(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn pagination_defaults_when_absent() {
        let p = Pagination::from_query(&HashMap::new());
        assert_eq!(p.limit, 20);
        assert_eq!(p.offset, 0);
        assert_eq!(p.order, SortOrder::Ascending);
        assert_eq!(p.sort_by, "");
    }

    #[test]
    fn pagination_defaults_when_not_numeric() {
        let p = Pagination::from_query(&query(&[("limit", "ten"), ("offset", "1.5")]));
        assert_eq!(p.limit, 20);
        assert_eq!(p.offset, 0);
    }

    #[test]
    fn pagination_reads_trimmed_values() {
        let p = Pagination::from_query(&query(&[
            ("limit", " 5 "),
            ("offset", "10"),
            ("sortBy", " id "),
            ("order", "desc"),
        ]));
        assert_eq!(p.limit, 5);
        assert_eq!(p.offset, 10);
        assert_eq!(p.sort_by, "id");
        assert_eq!(p.order, SortOrder::Descending);
    }

    #[test]
    fn order_is_descending_only_for_exact_desc() {
        for raw in ["", "asc", "DESC", "descending", "random"] {
            assert_eq!(SortOrder::parse(raw), SortOrder::Ascending, "order={raw}");
        }
        assert_eq!(SortOrder::parse("desc"), SortOrder::Descending);
    }

    #[test]
    fn list_filter_sorts_by_creation_time_by_default() {
        let filter = ListFilter::from_query(&HashMap::new());
        assert_eq!(filter.pagination.sort_by, "created_at");
    }

    #[test]
    fn list_filter_rejects_out_of_range_limit() {
        let pipeline = ParamPipeline::default();
        let mut filter = ListFilter::from_query(&query(&[("limit", "101")]));
        let err = pipeline.prepare(&mut filter).unwrap_err();
        assert_eq!(err.to_string(), "400: ListFilter.limit: limit must be 100 or less");

        let mut filter = ListFilter::from_query(&query(&[("offset", "-1")]));
        let err = pipeline.prepare(&mut filter).unwrap_err();
        assert_eq!(err.to_string(), "400: ListFilter.offset: offset must be 0 or greater");
    }

    #[test]
    fn list_filter_rejects_unknown_sort_column() {
        let pipeline = ParamPipeline::default();
        let mut filter = ListFilter::from_query(&query(&[("sortBy", "password")]));
        let err = pipeline.prepare(&mut filter).unwrap_err();
        assert_eq!(
            err.to_string(),
            "400: ListFilter.sortBy: sortBy must be one of [id data created_at updated_at]"
        );
    }

    #[test]
    fn object_json_omits_unset_fields() {
        let json = serde_json::to_value(Object::default()).unwrap();
        assert_eq!(json, serde_json::json!({}));
    }

    #[test]
    fn create_body_ignores_server_fields() {
        let body: CreateObject = serde_json::from_value(serde_json::json!({
            "id": "123e4567-e89b-12d3-a456-426655440000",
            "data": "some data",
            "created_at": "2022-07-02T00:00:00Z"
        }))
        .unwrap();
        let object = Object::from(body);
        assert!(object.id.is_nil());
        assert_eq!(object.data, "some data");
        assert!(object.created_at.is_none());
    }

    #[test]
    fn create_requires_data() {
        let pipeline = ParamPipeline::default();
        let mut body = CreateObject { data: "  ".into() };
        let err = pipeline.prepare(&mut body).unwrap_err();
        assert_eq!(err.to_string(), "400: CreateObject.data: data is a required field");
    }
}

//! Values bound to the positional parameters of a built query.

use sqlx::postgres::{PgArguments, Postgres};
use sqlx::query::QueryAs;
use uuid::Uuid;

/// A value bound to one `$n` placeholder.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PgBindValue {
    I64(i64),
    Text(String),
    Uuid(Uuid),
}

impl From<i64> for PgBindValue {
    fn from(n: i64) -> Self {
        PgBindValue::I64(n)
    }
}

impl From<&str> for PgBindValue {
    fn from(s: &str) -> Self {
        PgBindValue::Text(s.to_string())
    }
}

impl From<Uuid> for PgBindValue {
    fn from(u: Uuid) -> Self {
        PgBindValue::Uuid(u)
    }
}

/// Bind `params` in order.
pub fn bind_all<'q, O>(
    mut query: QueryAs<'q, Postgres, O, PgArguments>,
    params: &'q [PgBindValue],
) -> QueryAs<'q, Postgres, O, PgArguments> {
    for p in params {
        query = match p {
            PgBindValue::I64(n) => query.bind(*n),
            PgBindValue::Text(s) => query.bind(s.as_str()),
            PgBindValue::Uuid(u) => query.bind(*u),
        };
    }
    query
}

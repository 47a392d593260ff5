//! Remote store access.
//!
//! All persistence is delegated to a hosted PostgREST-compatible store. The
//! store is addressed by table name with equality filters and an optional
//! ordering; rows travel as JSON objects keyed by the store's column names.
//!
//! Two backends implement the same surface:
//!
//! - [`RestStore`] - HTTP client for the hosted store (`/rest/v1/{table}`)
//! - [`MemoryStore`] - process-local tables for development and tests

mod memory;
mod rest;

pub use memory::MemoryStore;
pub use rest::RestStore;

use serde_json::Value;
use thiserror::Error;

use crate::config::StoreConfig;

/// A store row: column name to JSON value.
pub type Row = serde_json::Map<String, Value>;

/// Errors that can occur when talking to the remote store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The store rejected the request.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// A row collides with an existing key.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// A row could not be encoded or decoded.
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The client could not be configured.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Sort direction for [`Query::order`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    Ascending,
    Descending,
}

impl Order {
    /// PostgREST suffix for the `order` parameter.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ascending => "asc",
            Self::Descending => "desc",
        }
    }
}

/// A table selection: equality filters plus an optional ordering.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    table: &'static str,
    filters: Vec<(&'static str, Value)>,
    order: Option<(&'static str, Order)>,
}

impl Query {
    /// Select every row of `table`.
    #[must_use]
    pub const fn table(table: &'static str) -> Self {
        Self {
            table,
            filters: Vec::new(),
            order: None,
        }
    }

    /// Keep only rows whose `column` equals `value`.
    #[must_use]
    pub fn eq(mut self, column: &'static str, value: impl Into<Value>) -> Self {
        self.filters.push((column, value.into()));
        self
    }

    /// Order the result by `column`.
    #[must_use]
    pub const fn order(mut self, column: &'static str, order: Order) -> Self {
        self.order = Some((column, order));
        self
    }

    /// Target table name.
    #[must_use]
    pub const fn table_name(&self) -> &'static str {
        self.table
    }

    /// Equality filters in insertion order.
    #[must_use]
    pub fn filters(&self) -> &[(&'static str, Value)] {
        &self.filters
    }

    /// Requested ordering, if any.
    #[must_use]
    pub const fn ordering(&self) -> Option<(&'static str, Order)> {
        self.order
    }

    /// Whether `row` satisfies every equality filter.
    #[must_use]
    pub fn matches(&self, row: &Row) -> bool {
        self.filters.iter().all(|(column, expected)| {
            row.get(*column)
                .is_some_and(|actual| loosely_equal(actual, expected))
        })
    }
}

/// Compare two JSON scalars the way the store compares a filter to a column.
///
/// Values of different JSON types compare through their text form, so a
/// numeric id matches a filter built from a path segment string.
fn loosely_equal(a: &Value, b: &Value) -> bool {
    a == b
        || match (scalar_text(a), scalar_text(b)) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
}

/// Text form of a JSON scalar, as sent in a PostgREST filter.
pub(crate) fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null => Some("null".to_string()),
        Value::Array(_) | Value::Object(_) => None,
    }
}

/// Handle to the configured remote store backend.
#[derive(Debug, Clone)]
pub enum RemoteStore {
    Rest(RestStore),
    Memory(MemoryStore),
}

impl RemoteStore {
    /// Build the backend selected by configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn from_config(config: &StoreConfig) -> Result<Self, StoreError> {
        match config {
            StoreConfig::Rest(supabase) => Ok(Self::Rest(RestStore::new(supabase)?)),
            StoreConfig::Memory => Ok(Self::Memory(MemoryStore::new())),
        }
    }

    /// Short backend name for logs.
    #[must_use]
    pub const fn backend(&self) -> &'static str {
        match self {
            Self::Rest(_) => "rest",
            Self::Memory(_) => "memory",
        }
    }

    /// Fetch the rows matching `query`.
    ///
    /// # Errors
    ///
    /// Returns an error if the store request fails.
    pub async fn select(&self, query: &Query) -> Result<Vec<Row>, StoreError> {
        match self {
            Self::Rest(store) => store.select(query).await,
            Self::Memory(store) => Ok(store.select(query).await),
        }
    }

    /// Insert new rows; fails on key collisions.
    ///
    /// # Errors
    ///
    /// Returns an error if the store request fails or a key already exists.
    pub async fn insert(&self, table: &'static str, rows: Vec<Row>) -> Result<(), StoreError> {
        match self {
            Self::Rest(store) => store.insert(table, rows).await,
            Self::Memory(store) => store.insert(table, rows).await,
        }
    }

    /// Insert rows, merging into existing rows with the same key.
    ///
    /// # Errors
    ///
    /// Returns an error if the store request fails.
    pub async fn upsert(&self, table: &'static str, rows: Vec<Row>) -> Result<(), StoreError> {
        match self {
            Self::Rest(store) => store.upsert(table, rows).await,
            Self::Memory(store) => {
                store.upsert(table, rows).await;
                Ok(())
            }
        }
    }

    /// Overwrite the columns present in `patch` on every matching row.
    ///
    /// # Errors
    ///
    /// Returns an error if the store request fails.
    pub async fn update(&self, query: &Query, patch: Row) -> Result<(), StoreError> {
        match self {
            Self::Rest(store) => store.update(query, patch).await,
            Self::Memory(store) => {
                store.update(query, &patch).await;
                Ok(())
            }
        }
    }

    /// Delete every matching row.
    ///
    /// # Errors
    ///
    /// Returns an error if the store request fails.
    pub async fn delete(&self, query: &Query) -> Result<(), StoreError> {
        match self {
            Self::Rest(store) => store.delete(query).await,
            Self::Memory(store) => {
                store.delete(query).await;
                Ok(())
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    fn row(value: &Value) -> Row {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_query_builder() {
        let query = Query::table("course_messages")
            .eq("courseid", 4)
            .order("timestamp", Order::Ascending);

        assert_eq!(query.table_name(), "course_messages");
        assert_eq!(query.filters(), &[("courseid", json!(4))]);
        assert_eq!(query.ordering(), Some(("timestamp", Order::Ascending)));
    }

    #[test]
    fn test_query_matches_all_filters() {
        let query = Query::table("enrollments")
            .eq("courseid", 1)
            .eq("userid", "anna@example.com");

        assert!(query.matches(&row(&json!({"courseid": 1, "userid": "anna@example.com"}))));
        assert!(!query.matches(&row(&json!({"courseid": 2, "userid": "anna@example.com"}))));
        assert!(!query.matches(&row(&json!({"courseid": 1}))));
    }

    #[test]
    fn test_query_matches_across_json_types() {
        let query = Query::table("courses").eq("id", "12");
        assert!(query.matches(&row(&json!({"id": 12}))));
    }

    #[test]
    fn test_order_suffix() {
        assert_eq!(Order::Ascending.as_str(), "asc");
        assert_eq!(Order::Descending.as_str(), "desc");
    }

    #[test]
    fn test_store_error_display() {
        let err = StoreError::Api {
            status: 400,
            message: "bad filter".to_string(),
        };
        assert_eq!(err.to_string(), "API error: 400 - bad filter");
    }
}

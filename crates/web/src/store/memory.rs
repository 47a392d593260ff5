//! Process-local store emulating the hosted schema.
//!
//! Each table knows its key columns, its serial column and the timestamp
//! columns the hosted schema fills with `now()`, so rows round-trip the same
//! way they do against the real store.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::Value;
use tokio::sync::RwLock;

use super::{Order, Query, Row, StoreError};

/// Schema facts for one table.
struct TableSchema {
    key: &'static [&'static str],
    serial: Option<&'static str>,
    defaults_now: &'static [&'static str],
}

const fn schema(table: &str) -> TableSchema {
    match table.as_bytes() {
        b"authorized_emails" => TableSchema {
            key: &["email"],
            serial: None,
            defaults_now: &["addedat"],
        },
        b"courses" => TableSchema {
            key: &["id"],
            serial: Some("id"),
            defaults_now: &["createdat"],
        },
        b"enrollments" => TableSchema {
            key: &["courseid", "userid"],
            serial: None,
            defaults_now: &["enrolledat"],
        },
        b"course_messages" => TableSchema {
            key: &["id"],
            serial: Some("id"),
            defaults_now: &["timestamp"],
        },
        _ => TableSchema {
            key: &[],
            serial: None,
            defaults_now: &[],
        },
    }
}

#[derive(Default)]
struct Table {
    rows: Vec<Row>,
    next_id: i64,
}

impl Table {
    /// Fill the serial column and `now()` defaults of a row about to be inserted.
    fn apply_defaults(&mut self, schema: &TableSchema, row: &mut Row) {
        if let Some(serial) = schema.serial {
            match row.get(serial).and_then(Value::as_i64) {
                Some(explicit) => self.next_id = self.next_id.max(explicit),
                None => {
                    self.next_id += 1;
                    row.insert(serial.to_string(), Value::from(self.next_id));
                }
            }
        }

        for column in schema.defaults_now {
            if row.get(*column).is_none_or(Value::is_null) {
                row.insert((*column).to_string(), Value::String(now_timestamp()));
            }
        }
    }

    fn position_of(&self, schema: &TableSchema, row: &Row) -> Option<usize> {
        if schema.key.is_empty() {
            return None;
        }
        self.rows.iter().position(|existing| {
            schema.key.iter().all(|column| {
                matches!(
                    (existing.get(*column), row.get(*column)),
                    (Some(a), Some(b)) if a == b
                )
            })
        })
    }
}

/// In-memory tables behind a shared lock.
#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<HashMap<String, Table>>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) async fn select(&self, query: &Query) -> Vec<Row> {
        let tables = self.tables.read().await;
        let Some(table) = tables.get(query.table_name()) else {
            return Vec::new();
        };

        let mut rows: Vec<Row> = table
            .rows
            .iter()
            .filter(|row| query.matches(row))
            .cloned()
            .collect();

        if let Some((column, order)) = query.ordering() {
            rows.sort_by(|a, b| {
                let ordering = compare_values(a.get(column), b.get(column));
                match order {
                    Order::Ascending => ordering,
                    Order::Descending => ordering.reverse(),
                }
            });
        }

        rows
    }

    pub(crate) async fn insert(&self, table: &str, rows: Vec<Row>) -> Result<(), StoreError> {
        let schema = schema(table);
        let mut tables = self.tables.write().await;
        let entry = tables.entry(table.to_string()).or_default();

        let mut staged: Vec<Row> = Vec::with_capacity(rows.len());
        for mut row in rows {
            entry.apply_defaults(&schema, &mut row);
            let duplicate_staged = staged.iter().any(|other| {
                !schema.key.is_empty()
                    && schema
                        .key
                        .iter()
                        .all(|column| other.get(*column) == row.get(*column))
            });
            if entry.position_of(&schema, &row).is_some() || duplicate_staged {
                return Err(StoreError::Conflict(format!(
                    "duplicate key value violates unique constraint on {table} ({})",
                    schema.key.join(", ")
                )));
            }
            staged.push(row);
        }

        entry.rows.extend(staged);
        Ok(())
    }

    pub(crate) async fn upsert(&self, table: &str, rows: Vec<Row>) {
        let schema = schema(table);
        let mut tables = self.tables.write().await;
        let entry = tables.entry(table.to_string()).or_default();

        for mut row in rows {
            let existing = entry.position_of(&schema, &row);
            match existing.and_then(|index| entry.rows.get_mut(index)) {
                Some(current) => current.extend(row),
                None => {
                    entry.apply_defaults(&schema, &mut row);
                    entry.rows.push(row);
                }
            }
        }
    }

    pub(crate) async fn update(&self, query: &Query, patch: &Row) {
        let mut tables = self.tables.write().await;
        if let Some(table) = tables.get_mut(query.table_name()) {
            for row in table.rows.iter_mut().filter(|row| query.matches(row)) {
                row.extend(patch.clone());
            }
        }
    }

    pub(crate) async fn delete(&self, query: &Query) {
        let mut tables = self.tables.write().await;
        if let Some(table) = tables.get_mut(query.table_name()) {
            table.rows.retain(|row| !query.matches(row));
        }
    }
}

impl std::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStore").finish_non_exhaustive()
    }
}

/// Timestamp in the store's text format.
fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Order two column values ascending; missing and null values sort last.
///
/// Descending selects reverse this, putting nulls first as PostgREST does.
fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    let a = a.filter(|value| !value.is_null());
    let b = b.filter(|value| !value.is_null());

    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(Value::Number(a)), Some(Value::Number(b))) => a
            .as_f64()
            .partial_cmp(&b.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(Value::String(a)), Some(Value::String(b))) => {
            match (DateTime::parse_from_rfc3339(a), DateTime::parse_from_rfc3339(b)) {
                (Ok(a), Ok(b)) => a.cmp(&b),
                _ => a.cmp(b),
            }
        }
        (Some(Value::Bool(a)), Some(Value::Bool(b))) => a.cmp(b),
        (Some(a), Some(b)) => a.to_string().cmp(&b.to_string()),
    }
}

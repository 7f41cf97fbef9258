//! Row-store port used by the reconciler.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use super::error::SyncError;

/// Filter operator and operand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterOp {
    Eq(String),
    In(Vec<String>),
}

/// A column filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    pub column: String,
    pub op: FilterOp,
}

impl Filter {
    pub fn eq(column: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            op: FilterOp::Eq(value.into()),
        }
    }

    pub fn any_of<I, S>(column: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            column: column.into(),
            op: FilterOp::In(values.into_iter().map(Into::into).collect()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub column: String,
    pub ascending: bool,
}

impl Order {
    pub fn asc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            ascending: true,
        }
    }

    pub fn desc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            ascending: false,
        }
    }
}

/// Filtered, ordered, optionally limited select.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectQuery {
    pub filters: Vec<Filter>,
    pub order: Option<Order>,
    pub limit: Option<usize>,
}

impl SelectQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn order(mut self, order: Order) -> Self {
        self.order = Some(order);
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// A row-oriented remote table store.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Rows of `table` matching `query`.
    async fn select(&self, table: &str, query: &SelectQuery) -> Result<Vec<Value>, SyncError>;

    /// Insert or merge `rows`, resolving conflicts on the `on_conflict`
    /// columns. An empty slice is a no-op.
    async fn upsert(&self, table: &str, rows: &[Value], on_conflict: &str) -> Result<(), SyncError>;

    /// Delete rows matching every filter.
    async fn delete(&self, table: &str, filters: &[Filter]) -> Result<(), SyncError>;

    /// Append `rows`. An empty slice is a no-op.
    async fn insert(&self, table: &str, rows: &[Value]) -> Result<(), SyncError>;
}

#[async_trait]
impl<T: RemoteStore + ?Sized> RemoteStore for Arc<T> {
    async fn select(&self, table: &str, query: &SelectQuery) -> Result<Vec<Value>, SyncError> {
        (**self).select(table, query).await
    }

    async fn upsert(&self, table: &str, rows: &[Value], on_conflict: &str) -> Result<(), SyncError> {
        (**self).upsert(table, rows, on_conflict).await
    }

    async fn delete(&self, table: &str, filters: &[Filter]) -> Result<(), SyncError> {
        (**self).delete(table, filters).await
    }

    async fn insert(&self, table: &str, rows: &[Value]) -> Result<(), SyncError> {
        (**self).insert(table, rows).await
    }
}

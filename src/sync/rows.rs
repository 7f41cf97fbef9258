//! Mapping between local entities and remote table rows.

use serde_json::{Value, json};

use crate::core::numeric::decimal_to_json;
use crate::core::{Book, Customer, Draft, RawRow, normalize_book, normalize_customer};

use super::remote::Order;

/// Conflict target shared by every synced table.
pub const CONFLICT_TARGET: &str = "workspace_id,uid";

/// Describes how one entity collection is stored remotely.
///
/// Rows produced by [`RowMapper::to_row`] carry neither `workspace_id` nor
/// (necessarily) `updated_at`; the reconciler stamps both.
pub trait RowMapper: Send + Sync {
    type Entity: Clone + Send + Sync;

    fn table(&self) -> &'static str;

    fn conflict_target(&self) -> &'static str {
        CONFLICT_TARGET
    }

    /// Canonical ordering for loads.
    fn order(&self) -> Order;

    /// Value of the `uid` column.
    fn identity(&self, entity: &Self::Entity) -> String;

    fn to_row(&self, entity: &Self::Entity) -> Value;

    /// `None` for rows that cannot be read back; those are skipped.
    fn from_row(&self, row: &Value) -> Option<Self::Entity>;
}

fn raw_row(row: &Value) -> Option<RawRow> {
    RawRow::try_from(row.clone()).ok()
}

/// Catalog rows in `books`.
#[derive(Debug, Clone, Copy, Default)]
pub struct BookRows;

impl RowMapper for BookRows {
    type Entity = Book;

    fn table(&self) -> &'static str {
        "books"
    }

    fn order(&self) -> Order {
        Order::asc("title")
    }

    fn identity(&self, book: &Book) -> String {
        book.uid.clone()
    }

    fn to_row(&self, book: &Book) -> Value {
        let mut row = json!({
            "uid": book.uid,
            "sku": book.sku,
            "title": book.title,
            "author": book.author,
            "publisher": book.publisher,
            "mrp": decimal_to_json(book.mrp),
            "default_discount_pct": decimal_to_json(book.default_discount_pct),
            "default_tax_pct": book.default_tax_pct.map(decimal_to_json),
        });
        if let Some(object) = row.as_object_mut() {
            if let Some(created) = book.created_at {
                object.insert("created_at".into(), Value::String(created.to_rfc3339()));
            }
            if let Some(updated) = book.updated_at {
                object.insert("updated_at".into(), Value::String(updated.to_rfc3339()));
            }
        }
        row
    }

    fn from_row(&self, row: &Value) -> Option<Book> {
        raw_row(row).map(|raw| normalize_book(&raw))
    }
}

/// Customer rows in `customers`.
#[derive(Debug, Clone, Copy, Default)]
pub struct CustomerRows;

impl RowMapper for CustomerRows {
    type Entity = Customer;

    fn table(&self) -> &'static str {
        "customers"
    }

    fn order(&self) -> Order {
        Order::asc("invoice_no")
    }

    fn identity(&self, customer: &Customer) -> String {
        customer.uid.clone()
    }

    fn to_row(&self, customer: &Customer) -> Value {
        serde_json::to_value(customer).unwrap_or(Value::Null)
    }

    fn from_row(&self, row: &Value) -> Option<Customer> {
        raw_row(row).map(|raw| normalize_customer(&raw))
    }
}

/// Saved drafts in `invoice_drafts`; the draft id is the row `uid`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DraftRows;

impl RowMapper for DraftRows {
    type Entity = Draft;

    fn table(&self) -> &'static str {
        "invoice_drafts"
    }

    fn order(&self) -> Order {
        Order::desc("updated_at")
    }

    fn identity(&self, draft: &Draft) -> String {
        draft.id.clone()
    }

    fn to_row(&self, draft: &Draft) -> Value {
        json!({
            "uid": draft.id,
            "label": draft.label,
            "meta": draft.meta,
            "lines": draft.lines,
            "pdf_column_prefs": draft.pdf_column_prefs,
            "created_at": draft.created_at.to_rfc3339(),
            "updated_at": draft.updated_at.to_rfc3339(),
        })
    }

    fn from_row(&self, row: &Value) -> Option<Draft> {
        let text = |key: &str| row.get(key).and_then(Value::as_str).map(str::to_string);
        let time = |key: &str| {
            text(key)
                .and_then(|t| chrono::DateTime::parse_from_rfc3339(&t).ok())
                .map(|t| t.with_timezone(&chrono::Utc))
        };
        let id = text("uid").filter(|id| !id.is_empty())?;
        let updated_at = time("updated_at").or_else(|| time("created_at"))?;
        Some(Draft {
            id,
            label: text("label").unwrap_or_default(),
            meta: row
                .get("meta")
                .and_then(|m| serde_json::from_value(m.clone()).ok())
                .unwrap_or_default(),
            lines: row
                .get("lines")
                .and_then(|l| serde_json::from_value(l.clone()).ok())
                .unwrap_or_default(),
            pdf_column_prefs: row
                .get("pdf_column_prefs")
                .and_then(|p| serde_json::from_value(p.clone()).ok())
                .unwrap_or_default(),
            created_at: time("created_at").unwrap_or(updated_at),
            updated_at,
        })
    }
}

//! Mapping of heterogeneous spreadsheet rows onto canonical records.
//!
//! Each canonical field has a priority-ordered list of accepted column
//! names. Lookup first tries every synonym verbatim, then retries with
//! folded keys (lowercase, letters and digits only), so `Invoice No`,
//! `invoiceNo` and `INVOICE_NO` all land on `invoice_no`. Cells that are
//! missing, `null`, or blank count as absent and the next synonym is tried.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::{Map, Value};

use super::identity::{book_key, customer_key, random_uid};
use super::numeric::{Numeric, parse_numeric, text_of};
use super::types::{BatchLine, Book, Customer};

/// A raw row as produced by the CSV reader or read back from JSON.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRow(Map<String, Value>);

impl RawRow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a cell, returning `self` for chaining.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Serialize any record into a raw row (e.g. to re-normalize it).
    pub fn from_record<T: Serialize>(record: &T) -> Self {
        match serde_json::to_value(record) {
            Ok(Value::Object(map)) => Self(map),
            _ => Self::default(),
        }
    }

    /// First non-blank cell among `synonyms`.
    pub fn lookup(&self, synonyms: &[&str]) -> Option<&Value> {
        let usable = |v: &&Value| match v {
            Value::Null => false,
            Value::String(s) => !s.trim().is_empty(),
            _ => true,
        };
        synonyms
            .iter()
            .find_map(|key| self.0.get(*key).filter(usable))
            .or_else(|| {
                synonyms.iter().find_map(|key| {
                    let wanted = fold_key(key);
                    self.0
                        .iter()
                        .find(|(k, v)| fold_key(k) == wanted && usable(v))
                        .map(|(_, v)| v)
                })
            })
    }

    fn text(&self, synonyms: &[&str]) -> String {
        self.lookup(synonyms).map(text_of).unwrap_or_default()
    }

    fn opt_text(&self, synonyms: &[&str]) -> Option<String> {
        let text = self.text(synonyms);
        (!text.is_empty()).then_some(text)
    }

    fn number(&self, synonyms: &[&str]) -> Numeric {
        self.lookup(synonyms).map(parse_numeric).unwrap_or(Numeric::Missing)
    }

    fn timestamp(&self, synonyms: &[&str]) -> Option<DateTime<Utc>> {
        let text = self.text(synonyms);
        DateTime::parse_from_rfc3339(&text)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }
}

impl From<Map<String, Value>> for RawRow {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl From<HashMap<String, String>> for RawRow {
    fn from(map: HashMap<String, String>) -> Self {
        Self(map.into_iter().map(|(k, v)| (k, Value::String(v))).collect())
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for RawRow {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl TryFrom<Value> for RawRow {
    type Error = Value;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(other),
        }
    }
}

fn fold_key(key: &str) -> String {
    key.chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

// ── synonym tables ──────────────────────────────────────────────────────────

const UID: &[&str] = &["uid"];
const CREATED_AT: &[&str] = &["createdAt", "created_at"];
const UPDATED_AT: &[&str] = &["updatedAt", "updated_at"];

const BOOK_SKU: &[&str] = &["sku", "SKU", "isbn", "ISBN", "code"];
const BOOK_TITLE: &[&str] = &["title", "Title", "book_title", "name"];
const BOOK_AUTHOR: &[&str] = &["author", "Author", "authors"];
const BOOK_PUBLISHER: &[&str] = &["publisher", "Publisher", "imprint"];
const BOOK_MRP: &[&str] = &["mrp", "MRP", "price", "list_price", "listPrice"];
const BOOK_DISCOUNT: &[&str] = &["default_discount_pct", "discount", "discount_pct", "disc"];
const BOOK_TAX: &[&str] = &["default_tax_pct", "tax", "gst", "tax_pct", "gst_pct"];

const CUST_INVOICE_NO: &[&str] = &["invoice_no", "invoiceNo", "invoice_number", "invoice", "bill_no"];
const CUST_NAME: &[&str] = &["customer_name", "customerName", "name", "customer", "party"];
const CUST_BILLING: &[&str] = &["billing_address", "billingAddress", "address", "bill_to"];
const CUST_SHIPPING: &[&str] = &["shipping_address", "shippingAddress", "ship_to", "delivery_address"];
const CUST_GSTIN: &[&str] = &["gstin", "GSTIN", "gst_no", "gst_number"];
const CUST_PAN: &[&str] = &["pan", "PAN", "pan_no"];
const CUST_PLACE: &[&str] = &["place_of_supply", "placeOfSupply", "state"];
const CUST_EMAIL: &[&str] = &["email", "e-mail", "mail"];
const CUST_PHONE: &[&str] = &["phone", "mobile", "contact", "phone_no"];
const CUST_INVOICE_DATE: &[&str] = &["invoice_date", "invoiceDate", "date"];
const CUST_DUE_DATE: &[&str] = &["due_date", "dueDate", "due"];
const CUST_NOTES: &[&str] = &["notes", "note", "remarks"];

const LINE_INVOICE_NO: &[&str] = &["invoice_no", "invoiceNo", "invoice_number", "invoice"];
const LINE_KEY: &[&str] = &["sku_or_title", "sku", "title", "isbn"];
const LINE_QTY: &[&str] = &["qty", "quantity"];
const LINE_RATE: &[&str] = &["rate_override", "rate"];
const LINE_DISCOUNT: &[&str] = &["discount_pct_override", "discount_pct", "discount"];
const LINE_TAX: &[&str] = &["tax_pct_override", "tax_pct", "tax", "gst"];

/// Normalize a catalog row. Idempotent: normalizing the serialized output
/// again yields the same record.
pub fn normalize_book(raw: &RawRow) -> Book {
    let sku = raw.text(BOOK_SKU);
    let title = raw.text(BOOK_TITLE);
    let uid = raw
        .opt_text(UID)
        .or_else(|| book_key(&sku, &title))
        .unwrap_or_else(random_uid);
    Book {
        uid,
        sku,
        title,
        author: raw.text(BOOK_AUTHOR),
        publisher: raw.text(BOOK_PUBLISHER),
        mrp: raw.number(BOOK_MRP).or(Decimal::ZERO),
        default_discount_pct: raw.number(BOOK_DISCOUNT).or(Decimal::ZERO),
        default_tax_pct: match raw.number(BOOK_TAX) {
            Numeric::Value(v) => Some(v),
            Numeric::Invalid => Some(Decimal::ZERO),
            Numeric::Missing | Numeric::Blank => None,
        },
        created_at: raw.timestamp(CREATED_AT),
        updated_at: raw.timestamp(UPDATED_AT),
    }
}

/// Normalize a customer row. Shipping falls back to billing.
pub fn normalize_customer(raw: &RawRow) -> Customer {
    let invoice_no = raw.text(CUST_INVOICE_NO);
    let gstin = raw.text(CUST_GSTIN);
    let customer_name = raw.text(CUST_NAME);
    let billing_address = raw.text(CUST_BILLING);
    let shipping_address = raw
        .opt_text(CUST_SHIPPING)
        .unwrap_or_else(|| billing_address.clone());
    let uid = raw
        .opt_text(UID)
        .or_else(|| customer_key(&invoice_no, &gstin, &customer_name))
        .unwrap_or_else(random_uid);
    Customer {
        uid,
        invoice_no,
        customer_name,
        billing_address,
        shipping_address,
        gstin,
        pan: raw.text(CUST_PAN),
        place_of_supply: raw.text(CUST_PLACE),
        email: raw.text(CUST_EMAIL),
        phone: raw.text(CUST_PHONE),
        invoice_date: raw.text(CUST_INVOICE_DATE),
        due_date: raw.text(CUST_DUE_DATE),
        notes: raw.text(CUST_NOTES),
    }
}

/// Normalize a row of the per-customer batch line items file.
pub fn normalize_batch_line(raw: &RawRow) -> BatchLine {
    let opt_number = |synonyms: &[&str]| match raw.number(synonyms) {
        Numeric::Value(v) => Some(v),
        _ => None,
    };
    BatchLine {
        invoice_no: raw.text(LINE_INVOICE_NO),
        sku_or_title: raw.text(LINE_KEY),
        title: raw.opt_text(BOOK_TITLE),
        author: raw.opt_text(BOOK_AUTHOR),
        publisher: raw.opt_text(BOOK_PUBLISHER),
        qty: opt_number(LINE_QTY),
        mrp: opt_number(BOOK_MRP),
        rate_override: opt_number(LINE_RATE),
        discount_pct_override: opt_number(LINE_DISCOUNT),
        tax_pct_override: opt_number(LINE_TAX),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[test]
    fn book_synonyms_and_case() {
        let raw: RawRow = [
            ("SKU", json!(" 978-81 ")),
            ("Title", json!("Mahabharata")),
            ("AUTHOR", json!("Vyasa")),
            ("MRP", json!("450")),
            ("gst", json!(5)),
        ]
        .into_iter()
        .collect();
        let book = normalize_book(&raw);
        assert_eq!(book.sku, "978-81");
        assert_eq!(book.title, "Mahabharata");
        assert_eq!(book.author, "Vyasa");
        assert_eq!(book.mrp, dec!(450));
        assert_eq!(book.default_tax_pct, Some(dec!(5)));
        assert_eq!(book.uid, "978-81");
    }

    #[test]
    fn verbatim_synonym_beats_folded_match() {
        let raw = RawRow::new()
            .with("Book Title", "Folded")
            .with("book_title", "Exact");
        assert_eq!(normalize_book(&raw).title, "Exact");
    }

    #[test]
    fn blank_cells_fall_through() {
        let raw = RawRow::new().with("sku", "").with("SKU", "B-1");
        assert_eq!(normalize_book(&raw).sku, "B-1");
    }

    #[test]
    fn book_uid_falls_back_to_title_then_random() {
        let by_title = normalize_book(&RawRow::new().with("title", "Ramayana Retold"));
        assert_eq!(by_title.uid, "ramayana-retold");

        let anonymous = normalize_book(&RawRow::new().with("mrp", 10));
        assert!(!anonymous.uid.is_empty());
        assert_eq!(anonymous.default_tax_pct, None);
    }

    #[test]
    fn customer_shipping_defaults_to_billing() {
        let raw = RawRow::new()
            .with("Invoice No", 1001)
            .with("Customer Name", "Sahyadri Books")
            .with("Billing Address", "MG Road, Bengaluru");
        let c = normalize_customer(&raw);
        assert_eq!(c.invoice_no, "1001");
        assert_eq!(c.customer_name, "Sahyadri Books");
        assert_eq!(c.shipping_address, "MG Road, Bengaluru");
        assert_eq!(c.uid, "1001");
    }

    #[test]
    fn customer_uid_priority() {
        let by_gstin = normalize_customer(
            &RawRow::new()
                .with("gstin", "29ABCDE1234F1Z5")
                .with("name", "X"),
        );
        assert_eq!(by_gstin.uid, "29abcde1234f1z5");

        let by_name = normalize_customer(&RawRow::new().with("name", "Walk In"));
        assert_eq!(by_name.uid, "walk-in");
    }

    #[test]
    fn batch_line_overrides() {
        let raw = RawRow::new()
            .with("invoice_no", "INV-7")
            .with("sku_or_title", "978-81")
            .with("qty", "3")
            .with("rate_override", "")
            .with("tax_pct_override", 12);
        let line = normalize_batch_line(&raw);
        assert_eq!(line.invoice_no, "INV-7");
        assert_eq!(line.qty, Some(dec!(3)));
        assert_eq!(line.rate_override, None);
        assert_eq!(line.tax_pct_override, Some(dec!(12)));
    }

    #[test]
    fn renormalizing_is_idempotent() {
        let raw = RawRow::new()
            .with("Title", "  Kavya  ")
            .with("price", "abc")
            .with("discount", "7.5");
        let once = normalize_book(&raw);
        let twice = normalize_book(&RawRow::from_record(&once));
        assert_eq!(once, twice);

        let c = normalize_customer(&RawRow::new().with("customer", "Ankita").with("due", "01-01-2025"));
        assert_eq!(normalize_customer(&RawRow::from_record(&c)), c);
    }
}

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::columns::ColumnPrefs;
use super::numeric::{de_decimal, de_opt_decimal, de_opt_text, de_quantity, de_rate, de_text, one};

/// One row of an invoice.
///
/// Field names on the wire match the working-invoice JSON the operator's
/// browser state uses (`qty`, `mrp`, `discountPct`, `taxPct`); the long
/// names are accepted as aliases. Every numeric field deserializes leniently.
/// A row carrying both spellings of a field fails plain deserialization;
/// [`LineItem::from_value`] keeps the short name instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    /// Display title (required for display, may be empty).
    #[serde(default, deserialize_with = "de_text")]
    pub title: String,
    #[serde(default, deserialize_with = "de_opt_text", skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, deserialize_with = "de_opt_text", skip_serializing_if = "Option::is_none")]
    pub publisher: Option<String>,
    #[serde(default, deserialize_with = "de_opt_text", skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    /// Quantity, default 1.
    #[serde(rename = "qty", alias = "quantity", default = "one", deserialize_with = "de_quantity")]
    pub quantity: Decimal,
    /// List price (MRP).
    #[serde(rename = "mrp", alias = "listPrice", default, deserialize_with = "de_decimal")]
    pub list_price: Decimal,
    /// Override unit price; `None` means the list price applies.
    #[serde(default, deserialize_with = "de_rate")]
    pub rate: Option<Decimal>,
    #[serde(rename = "discountPct", alias = "discountPercent", default, deserialize_with = "de_decimal")]
    pub discount_pct: Decimal,
    #[serde(rename = "taxPct", alias = "taxPercent", default, deserialize_with = "de_decimal")]
    pub tax_pct: Decimal,
    /// Explicit export sort key; falls back to the array position.
    #[serde(default, deserialize_with = "de_opt_decimal", skip_serializing_if = "Option::is_none")]
    pub order: Option<Decimal>,
}

const LINE_ALIASES: [(&str, &str); 4] = [
    ("qty", "quantity"),
    ("mrp", "listPrice"),
    ("discountPct", "discountPercent"),
    ("taxPct", "taxPercent"),
];

impl LineItem {
    /// A line with the given title, quantity, and list price; no discount or tax.
    pub fn new(title: impl Into<String>, quantity: Decimal, list_price: Decimal) -> Self {
        Self {
            title: title.into(),
            author: None,
            publisher: None,
            sku: None,
            quantity,
            list_price,
            rate: None,
            discount_pct: Decimal::ZERO,
            tax_pct: Decimal::ZERO,
            order: None,
        }
    }

    pub fn author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    pub fn publisher(mut self, publisher: impl Into<String>) -> Self {
        self.publisher = Some(publisher.into());
        self
    }

    pub fn sku(mut self, sku: impl Into<String>) -> Self {
        self.sku = Some(sku.into());
        self
    }

    pub fn rate(mut self, rate: Decimal) -> Self {
        self.rate = Some(rate);
        self
    }

    pub fn discount(mut self, pct: Decimal) -> Self {
        self.discount_pct = pct;
        self
    }

    pub fn tax(mut self, pct: Decimal) -> Self {
        self.tax_pct = pct;
        self
    }

    pub fn order(mut self, order: Decimal) -> Self {
        self.order = Some(order);
        self
    }

    /// Read a stored line object. When a field appears under both its wire
    /// name and its long alias, the wire name wins.
    pub fn from_value(value: &Value) -> Result<Self, serde_json::Error> {
        let Value::Object(map) = value else {
            return serde_json::from_value(value.clone());
        };
        let mut map = map.clone();
        for (name, alias) in LINE_ALIASES {
            if map.contains_key(name) {
                map.remove(alias);
            }
        }
        serde_json::from_value(Value::Object(map))
    }

    /// Key used to skip catalog entries already present in the working lines.
    pub fn catalog_key(&self) -> String {
        format!(
            "{}__{}",
            self.sku.as_deref().unwrap_or_default(),
            self.title
        )
    }
}

/// Catalog entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    /// Stable identity (slug of sku, else slug of title, else random).
    pub uid: String,
    pub sku: String,
    pub title: String,
    pub author: String,
    pub publisher: String,
    #[serde(default, deserialize_with = "de_decimal")]
    pub mrp: Decimal,
    #[serde(default, deserialize_with = "de_decimal")]
    pub default_discount_pct: Decimal,
    /// `None` when the source row carried no tax column; the workspace
    /// default tax then applies when the book is added to an invoice.
    #[serde(default, deserialize_with = "de_opt_decimal")]
    pub default_tax_pct: Option<Decimal>,
    #[serde(rename = "createdAt", default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(rename = "updatedAt", default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Customer / invoice header record. Also serves as invoice metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Customer {
    pub uid: String,
    pub invoice_no: String,
    pub customer_name: String,
    pub billing_address: String,
    /// Defaults to the billing address during normalization.
    pub shipping_address: String,
    pub gstin: String,
    pub pan: String,
    pub place_of_supply: String,
    pub email: String,
    pub phone: String,
    pub invoice_date: String,
    pub due_date: String,
    pub notes: String,
}

impl Customer {
    /// Shipping address, falling back to billing.
    pub fn ship_to(&self) -> &str {
        if self.shipping_address.trim().is_empty() {
            &self.billing_address
        } else {
            &self.shipping_address
        }
    }
}

/// A row of the optional per-customer line items file used for batches.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchLine {
    pub invoice_no: String,
    /// Catalog lookup key: SKU or (case-insensitive) title.
    pub sku_or_title: String,
    #[serde(deserialize_with = "de_opt_text", skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(deserialize_with = "de_opt_text", skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(deserialize_with = "de_opt_text", skip_serializing_if = "Option::is_none")]
    pub publisher: Option<String>,
    #[serde(deserialize_with = "de_opt_decimal", skip_serializing_if = "Option::is_none")]
    pub qty: Option<Decimal>,
    #[serde(deserialize_with = "de_opt_decimal", skip_serializing_if = "Option::is_none")]
    pub mrp: Option<Decimal>,
    #[serde(deserialize_with = "de_opt_decimal", skip_serializing_if = "Option::is_none")]
    pub rate_override: Option<Decimal>,
    #[serde(deserialize_with = "de_opt_decimal", skip_serializing_if = "Option::is_none")]
    pub discount_pct_override: Option<Decimal>,
    #[serde(deserialize_with = "de_opt_decimal", skip_serializing_if = "Option::is_none")]
    pub tax_pct_override: Option<Decimal>,
}

/// Named, timestamped snapshot of an in-progress invoice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Draft {
    pub id: String,
    pub label: String,
    pub meta: Customer,
    pub lines: Vec<LineItem>,
    #[serde(default)]
    pub pdf_column_prefs: ColumnPrefs,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

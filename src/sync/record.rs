//! Append-only log of issued invoices.

use chrono::{DateTime, Utc};
use serde_json::{Value, json};

use crate::core::{ColumnPrefs, Customer, InvoiceTotals, LineItem};

use super::remote::RemoteStore;

pub const INVOICES_TABLE: &str = "invoices";

/// An issued invoice as stored remotely.
#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceRecord {
    pub meta: Customer,
    pub items: Vec<LineItem>,
    pub totals: InvoiceTotals,
    pub pdf_column_prefs: ColumnPrefs,
    /// Where the invoice was issued from: `manual` or `batch`.
    pub source: String,
}

impl InvoiceRecord {
    pub fn new(meta: Customer, items: Vec<LineItem>, totals: InvoiceTotals) -> Self {
        Self {
            meta,
            items,
            totals,
            pdf_column_prefs: ColumnPrefs::default(),
            source: "manual".to_string(),
        }
    }

    pub fn column_prefs(mut self, prefs: ColumnPrefs) -> Self {
        self.pdf_column_prefs = prefs;
        self
    }

    pub fn source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    /// Row for the `invoices` table. Blank invoice number and customer
    /// name are stored as null.
    pub fn to_row(&self, workspace: &str, created_at: DateTime<Utc>) -> Value {
        let non_blank = |s: &str| {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        };
        json!({
            "workspace_id": workspace,
            "invoice_no": non_blank(&self.meta.invoice_no),
            "customer_name": non_blank(&self.meta.customer_name),
            "meta": self.meta,
            "items": self.items,
            "totals": self.totals.to_value(),
            "pdf_column_prefs": self.pdf_column_prefs,
            "source": self.source,
            "created_at": created_at.to_rfc3339(),
        })
    }
}

#[cfg(feature = "pdf")]
impl From<&crate::render::RenderedInvoice> for InvoiceRecord {
    fn from(invoice: &crate::render::RenderedInvoice) -> Self {
        Self::new(invoice.meta.clone(), invoice.lines.clone(), invoice.totals).source("batch")
    }
}

/// Inserts `record` into the invoice log. Failures are logged and
/// reported as `false`; they never interrupt the export that issued the
/// invoice.
pub async fn persist_invoice_record(
    store: &dyn RemoteStore,
    workspace: &str,
    record: &InvoiceRecord,
) -> bool {
    let row = record.to_row(workspace, Utc::now());
    match store.insert(INVOICES_TABLE, &[row]).await {
        Ok(()) => true,
        Err(e) => {
            tracing::error!(
                workspace,
                invoice_no = %record.meta.invoice_no,
                error = %e,
                "failed to record issued invoice"
            );
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::aggregate;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    #[test]
    fn row_shape() {
        let items = vec![LineItem::new("A", dec!(2), dec!(50)).tax(dec!(18))];
        let totals = aggregate(&items);
        let meta = Customer {
            invoice_no: " INV-9 ".into(),
            ..Customer::default()
        };
        let at = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        let row = InvoiceRecord::new(meta, items, totals).to_row("w1", at);

        assert_eq!(row["workspace_id"], "w1");
        assert_eq!(row["invoice_no"], "INV-9");
        assert_eq!(row["customer_name"], Value::Null);
        assert_eq!(row["source"], "manual");
        assert_eq!(row["totals"]["net"], json!(118));
        assert_eq!(row["items"].as_array().map(Vec::len), Some(1));
        assert_eq!(row["created_at"], "2024-01-02T03:04:05+00:00");
    }
}

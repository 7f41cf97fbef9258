//! Single and batch invoice export.
//!
//! Batches render one customer at a time, in input order. Archive assembly
//! is left to the caller: the output is an ordered list of named PDFs.

use std::collections::HashSet;

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;

use crate::core::{
    BatchLine, BillingError, Book, Brand, ColumnPrefs, Customer, InvoiceTotals, LineItem,
    aggregate,
};

use super::document::render_invoice;
use super::layout::RenderRequest;

/// Policy knobs for [`generate_batch`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchOptions {
    /// When batch line rows are loaded but none belong to a customer, give
    /// that customer the shared working lines instead of an empty invoice.
    pub reuse_shared_lines: bool,
}

/// Inputs shared by every invoice of a batch.
#[derive(Debug, Clone)]
pub struct BatchInput<'a> {
    pub customers: &'a [Customer],
    pub catalog: &'a [Book],
    /// Per-customer line rows; empty means "not loaded".
    pub batch_items: &'a [BatchLine],
    /// The operator's working invoice lines.
    pub shared_lines: &'a [LineItem],
    pub default_tax_pct: Decimal,
    pub brand: &'a Brand,
    pub columns: ColumnPrefs,
    pub issued_on: NaiveDate,
}

/// A rendered invoice together with what went into it.
#[derive(Debug, Clone)]
pub struct RenderedInvoice {
    pub file_name: String,
    pub meta: Customer,
    pub lines: Vec<LineItem>,
    pub totals: InvoiceTotals,
    pub bytes: Vec<u8>,
}

/// `{invoice_no}.pdf`, or `invoice.pdf` when there is no number.
pub fn pdf_file_name(meta: &Customer) -> String {
    match meta.invoice_no.trim() {
        "" => "invoice.pdf".to_string(),
        no => format!("{no}.pdf"),
    }
}

/// `invoices_YYYYMMDD_HHmm.zip`
pub fn archive_file_name(now: NaiveDateTime) -> String {
    format!("invoices_{}.zip", now.format("%Y%m%d_%H%M"))
}

/// Header used for a single export when no customer is selected.
pub fn walk_in_customer(issued_on: NaiveDate) -> Customer {
    let today = issued_on.format("%d-%m-%Y").to_string();
    Customer {
        invoice_no: "DRAFT-001".into(),
        customer_name: "Walk-in Customer".into(),
        invoice_date: today.clone(),
        due_date: today,
        ..Customer::default()
    }
}

/// Render the working invoice for `meta` (or a walk-in customer).
pub fn export_single(
    meta: Option<&Customer>,
    lines: &[LineItem],
    brand: &Brand,
    columns: ColumnPrefs,
    issued_on: NaiveDate,
) -> Result<RenderedInvoice, BillingError> {
    let meta = meta.cloned().unwrap_or_else(|| walk_in_customer(issued_on));
    render_for(meta, lines.to_vec(), brand, columns, issued_on)
}

fn render_for(
    meta: Customer,
    lines: Vec<LineItem>,
    brand: &Brand,
    columns: ColumnPrefs,
    issued_on: NaiveDate,
) -> Result<RenderedInvoice, BillingError> {
    let totals = aggregate(&lines);
    let request = RenderRequest::new(&meta, &lines, &totals, brand)
        .columns(columns)
        .issued_on(issued_on);
    let bytes = render_invoice(&request)?;
    Ok(RenderedInvoice {
        file_name: pdf_file_name(&meta),
        meta,
        lines,
        totals,
        bytes,
    })
}

fn find_in_catalog<'a>(catalog: &'a [Book], key: &str) -> Option<&'a Book> {
    let key = key.trim();
    if key.is_empty() {
        return None;
    }
    let lowered = key.to_lowercase();
    catalog
        .iter()
        .find(|b| b.sku.trim() == key || b.title.trim().to_lowercase() == lowered)
}

fn first_text<'a>(candidates: impl IntoIterator<Item = Option<&'a str>>) -> Option<String> {
    candidates
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|s| !s.is_empty())
        .map(str::to_string)
}

/// Turn a batch row into an invoice line, filling gaps from the catalog.
pub fn resolve_batch_line(row: &BatchLine, catalog: &[Book], default_tax_pct: Decimal) -> LineItem {
    let book = find_in_catalog(catalog, &row.sku_or_title);
    let title = first_text([
        book.map(|b| b.title.as_str()),
        Some(row.sku_or_title.as_str()),
        row.title.as_deref(),
    ])
    .unwrap_or_else(|| "Item".to_string());

    let quantity = row.qty.filter(|q| !q.is_zero()).unwrap_or(Decimal::ONE);
    let list_price = row
        .mrp
        .or(book.map(|b| b.mrp))
        .or(row.rate_override)
        .unwrap_or(Decimal::ZERO);
    let discount = row
        .discount_pct_override
        .or(book.map(|b| b.default_discount_pct))
        .unwrap_or(Decimal::ZERO);
    let tax = row
        .tax_pct_override
        .or(book.and_then(|b| b.default_tax_pct))
        .unwrap_or(default_tax_pct);

    let mut line = LineItem::new(title, quantity, list_price).discount(discount).tax(tax);
    line.rate = row.rate_override;
    line.author = first_text([book.map(|b| b.author.as_str()), row.author.as_deref()]);
    line.publisher = first_text([book.map(|b| b.publisher.as_str()), row.publisher.as_deref()]);
    line.sku = book.and_then(|b| first_text([Some(b.sku.as_str())]));
    line
}

/// Lines a given customer's invoice is built from.
pub fn lines_for_customer(
    customer: &Customer,
    input: &BatchInput<'_>,
    options: BatchOptions,
) -> Vec<LineItem> {
    if input.batch_items.is_empty() {
        return input.shared_lines.to_vec();
    }
    let invoice_no = customer.invoice_no.trim();
    let own: Vec<LineItem> = input
        .batch_items
        .iter()
        .filter(|row| row.invoice_no.trim() == invoice_no)
        .map(|row| resolve_batch_line(row, input.catalog, input.default_tax_pct))
        .collect();
    if own.is_empty() && options.reuse_shared_lines {
        input.shared_lines.to_vec()
    } else {
        own
    }
}

/// Render one invoice per customer, in customer order.
pub fn generate_batch(
    input: &BatchInput<'_>,
    options: BatchOptions,
) -> Result<Vec<RenderedInvoice>, BillingError> {
    if input.customers.is_empty() {
        return Err(BillingError::Precondition(
            "load customers before generating a batch".into(),
        ));
    }

    let mut taken: HashSet<String> = HashSet::new();
    let mut output = Vec::with_capacity(input.customers.len());
    for (index, customer) in input.customers.iter().enumerate() {
        let lines = lines_for_customer(customer, input, options);
        tracing::info!(
            index,
            invoice_no = %customer.invoice_no,
            lines = lines.len(),
            "rendering batch invoice"
        );
        let mut rendered = render_for(
            customer.clone(),
            lines,
            input.brand,
            input.columns,
            input.issued_on,
        )?;

        if taken.contains(&rendered.file_name) {
            let stem = rendered.file_name.trim_end_matches(".pdf").to_string();
            let mut n = 2;
            while taken.contains(&format!("{stem}-{n}.pdf")) {
                n += 1;
            }
            rendered.file_name = format!("{stem}-{n}.pdf");
        }
        taken.insert(rendered.file_name.clone());
        output.push(rendered);
    }
    tracing::info!(invoices = output.len(), "batch complete");
    Ok(output)
}

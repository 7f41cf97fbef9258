use chrono::NaiveDate;
use serde_json::Value;

use crate::core::{
    BillingError, Brand, ColumnPrefs, Customer, InvoiceTotals, LineItem, Rgb,
};

use super::canvas::{Canvas, MARGIN, PAGE_WIDTH};
use super::layout::{Align, InvoiceLayout, RenderRequest, layout_invoice};

/// Render one invoice to PDF bytes.
///
/// Missing optional fields (author, address, notes, dates) never fail;
/// they print as a dash or are left out.
pub fn render_invoice(request: &RenderRequest<'_>) -> Result<Vec<u8>, BillingError> {
    draw(&layout_invoice(request))
}

/// Render from loosely typed JSON, as stored for issued invoices.
///
/// `items` must be an array of line objects and `totals` must carry every
/// numeric total; anything else is a [`BillingError::Render`].
pub fn render_invoice_json(
    meta: &Customer,
    items: &Value,
    totals: &Value,
    brand: &Brand,
    columns: ColumnPrefs,
    issued_on: NaiveDate,
) -> Result<Vec<u8>, BillingError> {
    let Value::Array(raw_items) = items else {
        return Err(BillingError::Render("items must be a list".into()));
    };
    let lines = raw_items
        .iter()
        .enumerate()
        .map(|(i, raw)| {
            LineItem::from_value(raw)
                .map_err(|e| BillingError::Render(format!("item {}: {e}", i + 1)))
        })
        .collect::<Result<Vec<_>, _>>()?;
    let totals = InvoiceTotals::from_value(totals)?;
    let request = RenderRequest::new(meta, &lines, &totals, brand)
        .columns(columns)
        .issued_on(issued_on);
    render_invoice(&request)
}

fn draw(layout: &InvoiceLayout) -> Result<Vec<u8>, BillingError> {
    let head = &layout.letterhead;
    let mut canvas = Canvas::new(head.font);

    canvas.text(&head.name, MARGIN, 40.0, head.header_size, true, Rgb::BLACK);
    canvas.set_cursor(48.0);
    canvas.paragraph(&head.address, head.body_size, false, Align::Left, Rgb::BLACK);
    canvas.paragraph(&head.contact, head.body_size, false, Align::Left, Rgb::BLACK);
    canvas.set_cursor(canvas.cursor().max(95.0));

    canvas.table(&layout.parties);
    canvas.advance(10.0);
    canvas.table(&layout.items);

    if let Some(summary) = &layout.summary {
        canvas.advance(12.0);
        canvas.table(summary);
    }
    if let Some(words) = &layout.amount_in_words {
        canvas.advance(6.0);
        canvas.table(words);
    }

    canvas.advance(8.0);
    canvas.paragraph(&layout.footer, 9.0, false, Align::Center, Rgb::BLACK);

    tracing::debug!(
        title = %layout.title,
        pages = canvas.page_count(),
        width = PAGE_WIDTH,
        "rendered invoice"
    );
    canvas.finish(&layout.title)
}

//! Pure description of an invoice page: every string and table the
//! renderer draws, in drawing order. No PDF types appear here.

use chrono::NaiveDate;

use crate::core::{
    Brand, ColumnPrefs, Customer, FontFamily, InvoiceTotals, LineItem, ResolvedColumns, Rgb,
    amount_in_words, compute_line, format_inr, format_percent, format_quantity, in_export_order,
};

use super::canvas::CONTENT_WIDTH;

/// Everything needed to lay out one invoice.
#[derive(Debug, Clone)]
pub struct RenderRequest<'a> {
    pub meta: &'a Customer,
    /// Lines in stored order; the renderer applies export order itself.
    pub items: &'a [LineItem],
    pub totals: &'a InvoiceTotals,
    pub brand: &'a Brand,
    pub columns: ColumnPrefs,
    /// Printed when the invoice carries no date of its own.
    pub issued_on: NaiveDate,
}

impl<'a> RenderRequest<'a> {
    pub fn new(
        meta: &'a Customer,
        items: &'a [LineItem],
        totals: &'a InvoiceTotals,
        brand: &'a Brand,
    ) -> Self {
        Self {
            meta,
            items,
            totals,
            brand,
            columns: ColumnPrefs::default(),
            issued_on: chrono::Local::now().date_naive(),
        }
    }

    pub fn columns(mut self, columns: ColumnPrefs) -> Self {
        self.columns = columns;
        self
    }

    pub fn issued_on(mut self, date: NaiveDate) -> Self {
        self.issued_on = date;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableColumn {
    pub title: String,
    /// Width in points.
    pub width: f32,
    pub align: Align,
}

impl TableColumn {
    fn new(title: &str, width: f32, align: Align) -> Self {
        Self {
            title: title.to_string(),
            width,
            align,
        }
    }
}

/// One table cell; unset styling inherits from the column and table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cell {
    pub text: String,
    pub bold: bool,
    pub color: Option<Rgb>,
    pub fill: Option<Rgb>,
    pub align: Option<Align>,
}

impl Cell {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn color(mut self, color: Rgb) -> Self {
        self.color = Some(color);
        self
    }

    pub fn fill(mut self, fill: Rgb) -> Self {
        self.fill = Some(fill);
        self
    }

    pub fn align(mut self, align: Align) -> Self {
        self.align = Some(align);
        self
    }
}

impl From<String> for Cell {
    fn from(text: String) -> Self {
        Self::new(text)
    }
}

impl From<&str> for Cell {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableStyle {
    pub font_size: f32,
    pub padding: f32,
    pub text_color: Rgb,
    /// Grid line colour; `None` draws no borders.
    pub grid: Option<Rgb>,
    pub head_fill: Rgb,
    pub head_color: Rgb,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub columns: Vec<TableColumn>,
    /// Whether to draw (and repeat on every page) the column titles.
    pub show_head: bool,
    pub rows: Vec<Vec<Cell>>,
    pub style: TableStyle,
}

impl Table {
    pub fn head(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.title.as_str()).collect()
    }

    /// Text of every body cell, row by row.
    pub fn texts(&self) -> Vec<Vec<&str>> {
        self.rows
            .iter()
            .map(|row| row.iter().map(|c| c.text.as_str()).collect())
            .collect()
    }
}

/// Letterhead block at the top of the first page.
#[derive(Debug, Clone, PartialEq)]
pub struct Letterhead {
    pub name: String,
    pub address: String,
    pub contact: String,
    pub font: FontFamily,
    pub header_size: f32,
    pub body_size: f32,
}

/// A laid-out invoice, sections in drawing order.
#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceLayout {
    pub title: String,
    pub letterhead: Letterhead,
    pub parties: Table,
    pub items: Table,
    pub summary: Option<Table>,
    pub amount_in_words: Option<Table>,
    pub footer: String,
    pub columns: ResolvedColumns,
}

const INDEX_WIDTH: f32 = 22.0;
const QTY_WIDTH: f32 = 34.0;
const RATE_WIDTH: f32 = 64.0;
const PCT_WIDTH: f32 = 40.0;
const MONEY_WIDTH: f32 = 72.0;

fn dash(text: &str) -> &str {
    let trimmed = text.trim();
    if trimmed.is_empty() { "-" } else { trimmed }
}

/// Lay out `request` into drawable sections.
pub fn layout_invoice(request: &RenderRequest<'_>) -> InvoiceLayout {
    let ordered = in_export_order(request.items);
    let columns = request
        .columns
        .resolve(ordered.iter().copied(), request.totals);
    let brand = request.brand;

    let summary = (!columns.titles_only).then(|| summary_table(request.totals, &columns, brand));
    let amount_in_words =
        (!columns.titles_only).then(|| words_table(request.totals, brand));

    InvoiceLayout {
        title: match request.meta.invoice_no.trim() {
            "" => "Invoice".to_string(),
            no => format!("Invoice {no}"),
        },
        letterhead: Letterhead {
            name: brand.name.clone(),
            address: brand.address.clone(),
            contact: brand.contact_line(),
            font: brand.font,
            header_size: brand.header_size,
            body_size: brand.body_size,
        },
        parties: parties_table(request),
        items: items_table(&ordered, request.totals, &columns, brand),
        summary,
        amount_in_words,
        footer: footer_text(request.meta, brand),
        columns,
    }
}

fn parties_table(request: &RenderRequest<'_>) -> Table {
    let meta = request.meta;
    let invoice_date = match meta.invoice_date.trim() {
        "" => request.issued_on.format("%d-%m-%Y").to_string(),
        date => date.to_string(),
    };
    let place = match meta.place_of_supply.trim() {
        "" => dash(&request.brand.place_of_supply).to_string(),
        place => place.to_string(),
    };
    let details = [
        ("Invoice No.", dash(&meta.invoice_no).to_string()),
        ("Invoice Date", invoice_date),
        ("Due Date", dash(&meta.due_date).to_string()),
        ("Place of Supply", place),
        ("GSTIN", dash(&meta.gstin).to_string()),
        ("PAN", dash(&meta.pan).to_string()),
    ]
    .iter()
    .map(|(label, value)| format!("{label}: {value}"))
    .collect::<Vec<_>>()
    .join("\n");

    Table {
        columns: vec![
            TableColumn::new("Bill To", CONTENT_WIDTH * 0.34, Align::Left),
            TableColumn::new("Ship To", CONTENT_WIDTH * 0.33, Align::Left),
            TableColumn::new("Details", CONTENT_WIDTH * 0.33, Align::Left),
        ],
        show_head: false,
        rows: vec![vec![
            Cell::new(format!(
                "Bill To\n{}\n{}",
                dash(&meta.customer_name),
                dash(&meta.billing_address)
            )),
            Cell::new(format!("Ship To\n{}", dash(meta.ship_to()))),
            Cell::new(details),
        ]],
        style: TableStyle {
            font_size: 10.0,
            padding: 2.0,
            text_color: Rgb::BLACK,
            grid: None,
            head_fill: Rgb::WHITE,
            head_color: Rgb::BLACK,
        },
    }
}

fn title_block(item: &LineItem) -> String {
    let byline = [item.author.as_deref(), item.publisher.as_deref()]
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" \u{2022} ");
    let title = dash(&item.title);
    if byline.is_empty() {
        title.to_string()
    } else {
        format!("{title}\n{byline}")
    }
}

fn items_table(
    ordered: &[&LineItem],
    totals: &InvoiceTotals,
    columns: &ResolvedColumns,
    brand: &Brand,
) -> Table {
    let style = TableStyle {
        font_size: 9.0,
        padding: 4.0,
        text_color: Rgb::SLATE_900,
        grid: Some(Rgb::SLATE_400),
        head_fill: brand.header_fill,
        head_color: Rgb::WHITE,
    };

    if columns.titles_only {
        return Table {
            columns: vec![
                TableColumn::new("#", INDEX_WIDTH, Align::Center),
                TableColumn::new("Title / Description", CONTENT_WIDTH - INDEX_WIDTH, Align::Left),
            ],
            show_head: true,
            rows: ordered
                .iter()
                .enumerate()
                .map(|(i, item)| vec![Cell::new((i + 1).to_string()), Cell::new(title_block(item))])
                .collect(),
            style,
        };
    }

    let mut fixed = vec![
        TableColumn::new("#", INDEX_WIDTH, Align::Center),
        TableColumn::new("Qty", QTY_WIDTH, Align::Center),
        TableColumn::new("Rate", RATE_WIDTH, Align::Center),
    ];
    if columns.discount {
        fixed.push(TableColumn::new("Disc%", PCT_WIDTH, Align::Center));
    }
    if columns.tax {
        fixed.push(TableColumn::new("Tax%", PCT_WIDTH, Align::Center));
    }
    if columns.amount {
        fixed.push(TableColumn::new("Amount", MONEY_WIDTH, Align::Right));
    }
    fixed.push(TableColumn::new("Net", MONEY_WIDTH, Align::Center));
    let used: f32 = fixed.iter().map(|c| c.width).sum();
    fixed.insert(
        1,
        TableColumn::new("Title / Description", CONTENT_WIDTH - used, Align::Left),
    );

    let mut rows: Vec<Vec<Cell>> = ordered
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let line = compute_line(item);
            let mut row = vec![
                Cell::new((i + 1).to_string()),
                Cell::new(title_block(item)),
                Cell::new(format_quantity(item.quantity)),
                Cell::new(format_inr(line.effective_rate)),
            ];
            if columns.discount {
                row.push(Cell::new(format_percent(item.discount_pct)));
            }
            if columns.tax {
                row.push(Cell::new(format_percent(item.tax_pct)));
            }
            if columns.amount {
                row.push(Cell::new(format_inr(line.gross_amount)));
            }
            row.push(Cell::new(format_inr(line.net_amount)));
            row
        })
        .collect();

    if !rows.is_empty() {
        let mut totals_row = vec![
            Cell::new(""),
            Cell::new("Totals").bold().align(Align::Right),
            Cell::new(format_quantity(totals.quantity)).bold(),
            Cell::new(""),
        ];
        if columns.discount {
            totals_row.push(Cell::new(format_inr(totals.discount)).bold());
        }
        if columns.tax {
            totals_row.push(Cell::new(format_inr(totals.tax)).bold());
        }
        if columns.amount {
            totals_row.push(Cell::new(format_inr(totals.amount)).bold());
        }
        totals_row.push(Cell::new(format_inr(totals.net)).bold().color(brand.accent));
        rows.push(totals_row);
    }

    Table {
        columns: fixed,
        show_head: true,
        rows,
        style,
    }
}

fn summary_table(totals: &InvoiceTotals, columns: &ResolvedColumns, brand: &Brand) -> Table {
    let label = |text: &str| Cell::new(text).bold().color(Rgb::SLATE_800);
    let value = |text: String| Cell::new(text).bold().color(Rgb::SLATE_900);

    let mut rows = vec![
        vec![
            label("Total Quantity"),
            Cell::new(format_quantity(totals.quantity))
                .bold()
                .color(Rgb::SLATE_800)
                .align(Align::Center),
        ],
        vec![label("Taxable Amount"), value(format_inr(totals.taxable))],
    ];
    if columns.discount {
        rows.push(vec![label("Total Discount"), value(format_inr(totals.discount))]);
    }
    rows.push(vec![label("Total Tax"), value(format_inr(totals.tax))]);
    rows.push(vec![
        Cell::new("Grand Total")
            .bold()
            .color(Rgb::SLATE_900)
            .fill(Rgb::SLATE_200),
        Cell::new(format_inr(totals.net))
            .bold()
            .color(brand.accent)
            .fill(Rgb::SLATE_200),
    ]);

    Table {
        columns: vec![
            TableColumn::new("Summary", CONTENT_WIDTH * 0.55, Align::Left),
            TableColumn::new("Amount", CONTENT_WIDTH * 0.45, Align::Right),
        ],
        show_head: true,
        rows,
        style: TableStyle {
            font_size: 11.0,
            padding: 8.0,
            text_color: Rgb::SLATE_900,
            grid: Some(Rgb::SLATE_400),
            head_fill: brand.header_fill,
            head_color: Rgb::WHITE,
        },
    }
}

fn words_table(totals: &InvoiceTotals, brand: &Brand) -> Table {
    Table {
        columns: vec![
            TableColumn::new("", CONTENT_WIDTH * 0.3, Align::Left),
            TableColumn::new("", CONTENT_WIDTH * 0.7, Align::Left),
        ],
        show_head: false,
        rows: vec![vec![
            Cell::new("Amount in Words")
                .bold()
                .color(Rgb::SLATE_800)
                .fill(Rgb::SLATE_100),
            Cell::new(amount_in_words(totals.net)).color(Rgb::SLATE_900),
        ]],
        style: TableStyle {
            font_size: 10.0,
            padding: 10.0,
            text_color: Rgb::SLATE_900,
            grid: Some(Rgb::SLATE_400),
            head_fill: brand.header_fill,
            head_color: Rgb::WHITE,
        },
    }
}

fn footer_text(meta: &Customer, brand: &Brand) -> String {
    let mut text = String::new();
    let notes = meta.notes.trim();
    if !notes.is_empty() {
        text.push_str(&format!("Notes: {notes}\n\n"));
    }
    text.push_str("TERMS AND CONDITIONS");
    for (i, term) in brand.terms.iter().enumerate() {
        text.push_str(&format!("\n{}. {term}", i + 1));
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::aggregate;
    use rust_decimal_macros::dec;

    fn sample() -> (Customer, Vec<LineItem>) {
        let meta = Customer {
            invoice_no: "INV-1".into(),
            customer_name: "Sahyadri Books".into(),
            billing_address: "MG Road".into(),
            ..Customer::default()
        };
        let lines = vec![
            LineItem::new("Kavya", dec!(2), dec!(100))
                .author("Pampa")
                .discount(dec!(10))
                .tax(dec!(18))
                .order(dec!(2)),
            LineItem::new("Vachana", dec!(1), dec!(50)).tax(dec!(18)).order(dec!(1)),
        ];
        (meta, lines)
    }

    fn issued() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 7, 5).unwrap()
    }

    #[test]
    fn full_layout() {
        let (meta, lines) = sample();
        let totals = aggregate(&lines);
        let brand = Brand::house();
        let layout = layout_invoice(&RenderRequest::new(&meta, &lines, &totals, &brand).issued_on(issued()));

        assert_eq!(
            layout.items.head(),
            ["#", "Title / Description", "Qty", "Rate", "Disc%", "Tax%", "Amount", "Net"]
        );
        let rows = layout.items.texts();
        // export order: order 1 before order 2
        assert_eq!(rows[0][1], "Vachana");
        assert_eq!(rows[1][1], "Kavya\nPampa");
        assert_eq!(
            rows[2],
            ["", "Totals", "3", "", "Rs 20", "Rs 41.4", "Rs 250", "Rs 271.4"]
        );
        let width: f32 = layout.items.columns.iter().map(|c| c.width).sum();
        assert!((width - CONTENT_WIDTH).abs() < 0.01);

        let summary = layout.summary.expect("summary");
        assert_eq!(summary.texts()[1], ["Taxable Amount", "Rs 230"]);
        assert_eq!(summary.texts()[4], ["Grand Total", "Rs 271.4"]);
        let words = layout.amount_in_words.expect("words");
        assert_eq!(
            words.texts()[0][1],
            "Two Hundred Seventy One Rupees and Forty Paise Only"
        );
        assert!(layout.parties.texts()[0][2].contains("Invoice Date: 05-07-2024"));
        assert!(layout.parties.texts()[0][2].contains("Place of Supply: Karnataka"));
    }

    #[test]
    fn titles_only_drops_money() {
        let (meta, lines) = sample();
        let totals = aggregate(&lines);
        let brand = Brand::house();
        let prefs = ColumnPrefs {
            titles_only: true,
            ..ColumnPrefs::default()
        };
        let layout = layout_invoice(&RenderRequest::new(&meta, &lines, &totals, &brand).columns(prefs));
        assert_eq!(layout.items.head(), ["#", "Title / Description"]);
        assert_eq!(layout.items.rows.len(), 2);
        assert!(layout.summary.is_none());
        assert!(layout.amount_in_words.is_none());
    }

    #[test]
    fn hidden_columns_and_empty_table() {
        let meta = Customer::default();
        let totals = InvoiceTotals::default();
        let brand = Brand::house();
        let prefs = ColumnPrefs {
            tax: Some(false),
            amount: Some(false),
            ..ColumnPrefs::default()
        };
        let layout = layout_invoice(&RenderRequest::new(&meta, &[], &totals, &brand).columns(prefs));
        assert_eq!(layout.items.head(), ["#", "Title / Description", "Qty", "Rate", "Net"]);
        assert!(layout.items.rows.is_empty());
        assert_eq!(layout.title, "Invoice");
        assert!(layout.parties.texts()[0][0].contains("Bill To\n-\n-"));
    }

    #[test]
    fn footer_lists_notes_and_terms() {
        let meta = Customer {
            notes: "Deliver by Friday".into(),
            ..Customer::default()
        };
        let text = footer_text(&meta, &Brand::house());
        assert!(text.starts_with("Notes: Deliver by Friday\n\nTERMS AND CONDITIONS\n1. Goods once sold"));
        assert!(text.ends_with("2. All disputes are subject to Bengaluru jurisdiction only"));
    }
}

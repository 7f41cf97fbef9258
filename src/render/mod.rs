//! PDF invoice rendering and batch export.
//!
//! Rendering is split in two steps: [`layout_invoice`] turns the invoice
//! into a page description (tables and text blocks, no PDF types), and the
//! canvas draws that description with `lopdf` using the built-in fonts.
//!
//! # Page sections
//!
//! | Section | Notes |
//! |---------|-------|
//! | Letterhead | Brand name, address, phone and GSTIN |
//! | Parties | Bill to, ship to, invoice identifiers |
//! | Items | Export order; optional Disc%/Tax%/Amount columns; totals row |
//! | Summary | Quantity, taxable, discount, tax, grand total |
//! | Amount in words | Indian numbering |
//! | Footer | Notes and terms |

mod batch;
mod canvas;
mod document;
mod layout;

pub use batch::{
    BatchInput, BatchOptions, RenderedInvoice, archive_file_name, export_single, generate_batch,
    lines_for_customer, pdf_file_name, resolve_batch_line, walk_in_customer,
};
pub use canvas::{CONTENT_WIDTH, MARGIN, PAGE_HEIGHT, PAGE_WIDTH, text_width, wrap};
pub use document::{render_invoice, render_invoice_json};
pub use layout::{
    Align, Cell, InvoiceLayout, Letterhead, RenderRequest, Table, TableColumn, TableStyle,
    layout_invoice,
};

use billbook::core::*;
use billbook::render::{export_single, layout_invoice, RenderRequest};
use chrono::NaiveDate;
use rust_decimal_macros::dec;

fn main() {
    let issued_on = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();

    // Catalog rows as they come out of a spreadsheet export
    let catalog: Vec<Book> = [
        RawRow::new()
            .with("ISBN", "978-81-7286-101-4")
            .with("Book Title", "Kannada Grammar")
            .with("Author", "F. Kittel")
            .with("MRP", "100")
            .with("Discount", "10"),
        RawRow::new()
            .with("ISBN", "978-81-7286-102-1")
            .with("Book Title", "Folk Tales of Karnataka")
            .with("MRP", 50),
        RawRow::new()
            .with("Book Title", "Poems")
            .with("MRP", 20)
            .with("GST", 0)
            .with("Discount", 5),
    ]
    .iter()
    .map(normalize_book)
    .collect();

    let customer = normalize_customer(
        &RawRow::new()
            .with("Invoice No", "INV-2024-017")
            .with("Customer Name", "Sahyadri Book House")
            .with("Billing Address", "12 Temple Street, Mysuru")
            .with("GSTIN", "29ABCDE1234F1Z5"),
    );

    let mut lines = Vec::new();
    add_books(&mut lines, &catalog, DEFAULT_TAX_PCT);
    update_line(&mut lines, 0, |line| line.quantity = dec!(2));
    update_line(&mut lines, 2, |line| line.quantity = dec!(5));

    let totals = aggregate(&lines);
    println!("Items:        {}", lines.len());
    println!("Taxable:      {}", format_inr(totals.taxable));
    println!("Tax:          {}", format_inr(totals.tax));
    println!("Grand total:  {}", format_inr(totals.net));
    println!("In words:     {}", amount_in_words(totals.net));

    let brands = BrandRegistry::with_defaults();
    let brand = brands.get(None);
    let columns = ColumnPrefs::default();

    let request = RenderRequest::new(&customer, &lines, &totals, brand)
        .columns(columns)
        .issued_on(issued_on);
    let layout = layout_invoice(&request);
    println!("Columns:      {}", layout.items.head().join(" | "));

    match export_single(Some(&customer), &lines, brand, columns, issued_on) {
        Ok(invoice) => {
            let path = std::env::temp_dir().join(&invoice.file_name);
            match std::fs::write(&path, &invoice.bytes) {
                Ok(()) => println!("Wrote {} ({} bytes)", path.display(), invoice.bytes.len()),
                Err(e) => eprintln!("Could not write {}: {e}", path.display()),
            }
        }
        Err(e) => eprintln!("Rendering failed: {e}"),
    }
}

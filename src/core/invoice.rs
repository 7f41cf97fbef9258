//! Operations on the working invoice: the editable list of lines the
//! operator builds from the catalog before exporting.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::types::{Book, LineItem};

/// Tax percent applied to catalog books that carry no default of their own.
pub const DEFAULT_TAX_PCT: Decimal = dec!(18);

/// A fresh line for `book`: quantity 1, no rate override, the book's
/// default discount, and its default tax or `default_tax_pct`.
pub fn line_from_book(book: &Book, default_tax_pct: Decimal) -> LineItem {
    let mut line = LineItem::new(book.title.clone(), Decimal::ONE, book.mrp)
        .discount(book.default_discount_pct)
        .tax(book.default_tax_pct.unwrap_or(default_tax_pct));
    line.author = non_empty(&book.author);
    line.publisher = non_empty(&book.publisher);
    line.sku = non_empty(&book.sku);
    line
}

fn non_empty(text: &str) -> Option<String> {
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Append a line for `book`.
pub fn add_book(lines: &mut Vec<LineItem>, book: &Book, default_tax_pct: Decimal) {
    lines.push(line_from_book(book, default_tax_pct));
}

/// Append lines for every book not already present (by `sku__title`).
/// Returns how many were added.
pub fn add_books<'a, I>(lines: &mut Vec<LineItem>, books: I, default_tax_pct: Decimal) -> usize
where
    I: IntoIterator<Item = &'a Book>,
{
    let before = lines.len();
    for book in books {
        let line = line_from_book(book, default_tax_pct);
        let key = line.catalog_key();
        if !lines.iter().any(|existing| existing.catalog_key() == key) {
            lines.push(line);
        }
    }
    lines.len() - before
}

/// Set every line's tax percent.
pub fn apply_default_tax(lines: &mut [LineItem], tax_pct: Decimal) {
    for line in lines {
        line.tax_pct = tax_pct;
    }
}

/// Edit the line at `index` in place. Returns `false` if out of range.
pub fn update_line<F>(lines: &mut [LineItem], index: usize, edit: F) -> bool
where
    F: FnOnce(&mut LineItem),
{
    match lines.get_mut(index) {
        Some(line) => {
            edit(line);
            true
        }
        None => false,
    }
}

pub fn remove_line(lines: &mut Vec<LineItem>, index: usize) -> Option<LineItem> {
    (index < lines.len()).then(|| lines.remove(index))
}

/// Move the line at `from` to position `to`, shifting the rest.
/// Out of range or equal indices leave the list untouched.
pub fn move_line(lines: &mut Vec<LineItem>, from: usize, to: usize) -> bool {
    if from == to || from >= lines.len() || to >= lines.len() {
        return false;
    }
    let line = lines.remove(from);
    lines.insert(to, line);
    true
}

/// Indices of `lines` in export order: ascending `order`, lines without one
/// keyed by their index, ties broken by index.
pub fn export_order(lines: &[LineItem]) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..lines.len()).collect();
    indices.sort_by(|&a, &b| {
        let key = |i: usize| lines[i].order.unwrap_or_else(|| Decimal::from(i));
        key(a).cmp(&key(b)).then(a.cmp(&b))
    });
    indices
}

/// Borrowed view of `lines` in export order. Does not touch the input.
pub fn in_export_order(lines: &[LineItem]) -> Vec<&LineItem> {
    export_order(lines).into_iter().map(|i| &lines[i]).collect()
}

/// Sort the stored lines into export order and renumber `order` 1..n.
pub fn apply_export_order(lines: &mut Vec<LineItem>) {
    let order = export_order(lines.as_slice());
    let mut slots: Vec<Option<LineItem>> = std::mem::take(lines).into_iter().map(Some).collect();
    lines.extend(order.into_iter().filter_map(|i| slots[i].take()));
    for (position, line) in lines.iter_mut().enumerate() {
        line.order = Some(Decimal::from(position + 1));
    }
}

/// Case-insensitive substring search over sku, title, author, and publisher.
pub fn filter_catalog<'a>(catalog: &'a [Book], query: &str) -> Vec<&'a Book> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return catalog.iter().collect();
    }
    catalog
        .iter()
        .filter(|book| {
            [&book.sku, &book.title, &book.author, &book.publisher]
                .iter()
                .any(|field| field.to_lowercase().contains(&needle))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::normalize::{RawRow, normalize_book};

    fn book(sku: &str, title: &str, tax: Option<i64>) -> Book {
        let mut row = RawRow::new().with("sku", sku).with("title", title).with("mrp", 100);
        if let Some(tax) = tax {
            row = row.with("tax", tax);
        }
        normalize_book(&row)
    }

    fn titled(title: &str, order: Option<i64>) -> LineItem {
        let line = LineItem::new(title, Decimal::ONE, dec!(10));
        match order {
            Some(o) => line.order(Decimal::from(o)),
            None => line,
        }
    }

    fn titles(lines: &[&LineItem]) -> Vec<String> {
        lines.iter().map(|l| l.title.clone()).collect()
    }

    #[test]
    fn book_tax_falls_back_to_workspace_default() {
        let with_tax = line_from_book(&book("A", "Alpha", Some(5)), DEFAULT_TAX_PCT);
        assert_eq!(with_tax.tax_pct, dec!(5));
        assert_eq!(with_tax.rate, None);
        assert_eq!(with_tax.quantity, Decimal::ONE);

        let without = line_from_book(&book("B", "Beta", None), DEFAULT_TAX_PCT);
        assert_eq!(without.tax_pct, dec!(18));
    }

    #[test]
    fn bulk_add_skips_present_books() {
        let catalog = vec![book("A", "Alpha", None), book("B", "Beta", None)];
        let mut lines = Vec::new();
        add_book(&mut lines, &catalog[0], DEFAULT_TAX_PCT);
        assert_eq!(add_books(&mut lines, &catalog, DEFAULT_TAX_PCT), 1);
        assert_eq!(lines.len(), 2);
    }

    #[test]
    fn export_order_sorts_by_key() {
        let lines = vec![titled("three", Some(3)), titled("one", Some(1)), titled("two", Some(2))];
        assert_eq!(titles(&in_export_order(&lines)), ["one", "two", "three"]);
        // stored order untouched
        assert_eq!(lines[0].title, "three");
    }

    #[test]
    fn missing_order_uses_index() {
        let lines = vec![titled("a", None), titled("b", Some(0)), titled("c", None)];
        // a→0, b→0 (tie, index 1 after 0), c→2
        assert_eq!(titles(&in_export_order(&lines)), ["a", "b", "c"]);

        let lines = vec![titled("a", None), titled("b", None), titled("c", Some(0))];
        assert_eq!(titles(&in_export_order(&lines)), ["a", "c", "b"]);
    }

    #[test]
    fn apply_export_order_renumbers() {
        let mut lines = vec![titled("x", Some(9)), titled("y", Some(4))];
        apply_export_order(&mut lines);
        assert_eq!(lines[0].title, "y");
        assert_eq!(lines[0].order, Some(dec!(1)));
        assert_eq!(lines[1].order, Some(dec!(2)));
    }

    #[test]
    fn move_and_remove() {
        let mut lines = vec![titled("a", None), titled("b", None), titled("c", None)];
        assert!(move_line(&mut lines, 0, 2));
        assert_eq!(lines.iter().map(|l| l.title.as_str()).collect::<Vec<_>>(), ["b", "c", "a"]);
        assert!(!move_line(&mut lines, 1, 1));
        assert!(!move_line(&mut lines, 0, 7));
        assert_eq!(remove_line(&mut lines, 1).map(|l| l.title), Some("c".into()));
        assert!(remove_line(&mut lines, 5).is_none());
        assert!(update_line(&mut lines, 0, |l| l.quantity = dec!(4)));
        assert_eq!(lines[0].quantity, dec!(4));
    }

    #[test]
    fn catalog_filter() {
        let catalog = vec![book("K-1", "Kannada Kavya", None), book("E-2", "English Essays", None)];
        assert_eq!(filter_catalog(&catalog, "").len(), 2);
        assert_eq!(filter_catalog(&catalog, "  kavya ")[0].sku, "K-1");
        assert_eq!(filter_catalog(&catalog, "e-2").len(), 1);
        assert!(filter_catalog(&catalog, "zzz").is_empty());
    }
}

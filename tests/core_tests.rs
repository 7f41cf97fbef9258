use billbook::core::*;
use chrono::{TimeZone, Utc};
use rust_decimal_macros::dec;
use serde_json::json;

fn scenario_lines() -> Vec<LineItem> {
    vec![
        LineItem::new("Kannada Grammar", dec!(2), dec!(100))
            .discount(dec!(10))
            .tax(dec!(18)),
        LineItem::new("Folk Tales", dec!(1), dec!(50)).tax(dec!(18)),
        LineItem::new("Poems", dec!(5), dec!(20)).discount(dec!(5)),
    ]
}

// --- Line computation ---

#[test]
fn three_line_scenario() {
    let lines = scenario_lines();
    let nets: Vec<_> = lines.iter().map(|l| compute_line(l).net_amount).collect();
    assert_eq!(nets, vec![dec!(212.4), dec!(59), dec!(95)]);

    let totals = aggregate(&lines);
    assert_eq!(totals.quantity, dec!(8));
    assert_eq!(totals.amount, dec!(350));
    assert_eq!(totals.discount, dec!(25));
    assert_eq!(totals.taxable, dec!(325));
    assert_eq!(totals.tax, dec!(41.4));
    assert_eq!(totals.net, dec!(366.4));
}

#[test]
fn blank_rate_falls_back_to_list_price() {
    let blank: LineItem =
        serde_json::from_value(json!({"title": "A", "qty": 2, "mrp": 100, "rate": ""})).unwrap();
    assert_eq!(compute_line(&blank).effective_rate, dec!(100));
    assert_eq!(compute_line(&blank).gross_amount, dec!(200));

    let priced: LineItem =
        serde_json::from_value(json!({"title": "A", "qty": 2, "mrp": 100, "rate": "80"})).unwrap();
    assert_eq!(compute_line(&priced).effective_rate, dec!(80));
    assert_eq!(compute_line(&priced).gross_amount, dec!(160));
}

#[test]
fn malformed_numbers_use_defaults() {
    let line: LineItem = serde_json::from_value(json!({
        "title": "Odd",
        "qty": "abc",
        "mrp": "12.5",
        "discountPct": null,
        "taxPct": "  "
    }))
    .unwrap();
    assert_eq!(line.quantity, dec!(1));
    assert_eq!(line.list_price, dec!(12.5));
    assert_eq!(line.discount_pct, dec!(0));
    assert_eq!(line.tax_pct, dec!(0));
    assert_eq!(compute_line(&line).net_amount, dec!(12.5));

    // doubled signs are garbage, not negative percentages
    let signs: LineItem = serde_json::from_value(json!({
        "title": "Signs",
        "qty": 1,
        "mrp": 100,
        "discountPct": "+-5",
        "taxPct": "-+1"
    }))
    .unwrap();
    assert_eq!(signs.discount_pct, dec!(0));
    assert_eq!(signs.tax_pct, dec!(0));
    assert_eq!(compute_line(&signs).net_amount, dec!(100));
}

#[test]
fn stored_lines_prefer_wire_names() {
    let row = json!({"title": "A", "qty": 1, "quantity": 2, "mrp": 10, "listPrice": 99});
    assert!(serde_json::from_value::<LineItem>(row.clone()).is_err());

    let line = LineItem::from_value(&row).unwrap();
    assert_eq!(line.quantity, dec!(1));
    assert_eq!(line.list_price, dec!(10));

    let long_only = LineItem::from_value(&json!({"title": "B", "quantity": 3})).unwrap();
    assert_eq!(long_only.quantity, dec!(3));
}

#[test]
fn empty_invoice_totals_are_zero() {
    let totals = aggregate(&Vec::<LineItem>::new());
    assert_eq!(totals, InvoiceTotals::default());
    assert_eq!(amount_in_words(totals.net), "Zero Rupees Only");
}

#[test]
fn totals_json_is_strict() {
    let totals = aggregate(&scenario_lines());
    assert_eq!(InvoiceTotals::from_value(&totals.to_value()).unwrap(), totals);

    let missing_net = json!({"qty": 1, "amount": 1, "discount": 0, "taxable": 1, "tax": 0});
    assert!(matches!(
        InvoiceTotals::from_value(&missing_net),
        Err(BillingError::Render(_))
    ));
}

// --- Formatting ---

#[test]
fn indian_grouping_in_currency() {
    assert_eq!(format_inr(dec!(1234567.5)), "Rs 12,34,567.5");
    assert_eq!(format_inr(dec!(999)), "Rs 999");
    assert_eq!(format_inr(dec!(0)), "Rs 0");
    assert_eq!(format_quantity(dec!(100000)), "1,00,000");
}

#[test]
fn amounts_in_words() {
    insta::assert_snapshot!(amount_in_words(dec!(366.4)), @"Three Hundred Sixty Six Rupees and Forty Paise Only");
    insta::assert_snapshot!(amount_in_words(dec!(1)), @"One Rupee Only");
    insta::assert_snapshot!(amount_in_words(dec!(-42)), @"Minus Forty Two Rupees Only");

    let big = amount_in_words(dec!(1234567.50));
    assert!(big.contains("Lakh"));
    assert!(big.contains("Fifty Paise"));
}

// --- Normalization and identity ---

#[test]
fn catalog_rows_with_odd_headers() {
    let raw: RawRow = [
        ("ISBN", json!("978-1")),
        ("Book Title", json!("Kavya")),
        ("MRP", json!("250")),
        ("GST", json!("")),
    ]
    .into_iter()
    .collect();
    let book = normalize_book(&raw);
    assert_eq!(book.sku, "978-1");
    assert_eq!(book.title, "Kavya");
    assert_eq!(book.mrp, dec!(250));
    assert_eq!(book.default_tax_pct, None);
    assert_eq!(book.uid, "978-1");
}

#[test]
fn upsert_by_sku_updates_in_place() {
    let mut catalog = vec![normalize_book(
        &RawRow::new().with("sku", "K-1").with("title", "Old title"),
    )];
    let result = upsert(
        &mut catalog,
        normalize_book(&RawRow::new().with("sku", "K-1").with("title", "New title")),
    );
    assert_eq!(result, Upsert::Updated(0));
    assert_eq!(catalog.len(), 1);
    assert_eq!(catalog[0].title, "New title");
    assert_eq!(catalog[0].uid, "k-1");
}

#[test]
fn customers_default_shipping_to_billing() {
    let customer = normalize_customer(
        &RawRow::new()
            .with("Invoice No", "INV 7")
            .with("Customer Name", "Sri Book House")
            .with("Address", "MG Road"),
    );
    assert_eq!(customer.invoice_no, "INV 7");
    assert_eq!(customer.shipping_address, "MG Road");
    assert_eq!(customer.uid, "inv-7");
}

// --- Working invoice ---

#[test]
fn export_order_follows_order_field() {
    let lines = vec![
        LineItem::new("C", dec!(1), dec!(1)).order(dec!(3)),
        LineItem::new("A", dec!(1), dec!(1)).order(dec!(1)),
        LineItem::new("B", dec!(1), dec!(1)).order(dec!(2)),
    ];
    let titles: Vec<_> = in_export_order(&lines).into_iter().map(|l| l.title.as_str()).collect();
    assert_eq!(titles, ["A", "B", "C"]);
}

#[test]
fn missing_order_keeps_position() {
    let lines = vec![
        LineItem::new("X", dec!(1), dec!(1)).order(dec!(5)),
        LineItem::new("Y", dec!(1), dec!(1)),
        LineItem::new("Z", dec!(1), dec!(1)).order(dec!(0.5)),
    ];
    assert_eq!(export_order(&lines), vec![2, 1, 0]);

    let mut stored = lines.clone();
    apply_export_order(&mut stored);
    let orders: Vec<_> = stored.iter().map(|l| (l.title.as_str(), l.order)).collect();
    assert_eq!(
        orders,
        [("Z", Some(dec!(1))), ("Y", Some(dec!(2))), ("X", Some(dec!(3)))]
    );
}

#[test]
fn books_become_lines_with_default_tax() {
    let with_tax = normalize_book(&RawRow::new().with("title", "A").with("mrp", 100).with("tax", 5));
    let without_tax = normalize_book(&RawRow::new().with("title", "B").with("mrp", 80));

    let mut lines = Vec::new();
    let added = add_books(&mut lines, [&with_tax, &without_tax, &with_tax], DEFAULT_TAX_PCT);
    assert_eq!(added, 2);
    assert_eq!(lines[0].tax_pct, dec!(5));
    assert_eq!(lines[1].tax_pct, dec!(18));
    assert_eq!(lines[1].quantity, dec!(1));

    assert!(move_line(&mut lines, 1, 0));
    assert_eq!(lines[0].title, "B");
    assert!(!move_line(&mut lines, 0, 9));
    assert_eq!(remove_line(&mut lines, 0).map(|l| l.title), Some("B".to_string()));
    assert_eq!(lines.len(), 1);
}

// --- Drafts and persistence ---

#[test]
fn drafts_replace_by_label() {
    let mut drafts = Vec::new();
    let meta = Customer {
        invoice_no: "INV-1".into(),
        ..Customer::default()
    };
    let first = Utc.with_ymd_and_hms(2024, 2, 1, 9, 0, 0).unwrap();
    let later = Utc.with_ymd_and_hms(2024, 2, 1, 18, 0, 0).unwrap();

    let id = save_draft(&mut drafts, "Morning", &meta, &scenario_lines(), ColumnPrefs::default(), first);
    let again = save_draft(&mut drafts, " morning ", &meta, &[], ColumnPrefs::default(), later);
    assert_eq!(id, again);
    assert_eq!(drafts.len(), 1);
    assert!(drafts[0].lines.is_empty());

    save_draft(&mut drafts, "", &meta, &[], ColumnPrefs::default(), first);
    assert_eq!(drafts[1].label, "INV-1");
    assert!(delete_draft(&mut drafts, &id).is_some());
    assert_eq!(drafts.len(), 1);
}

#[test]
fn workspace_survives_file_store() {
    let dir = std::env::temp_dir().join(format!("billbook-core-{}", std::process::id()));
    let mut store = FileStore::open(&dir).unwrap();

    let mut workspace = Workspace::default();
    workspace.lines = scenario_lines();
    workspace.default_tax_pct = dec!(12);
    workspace.filter = "kannada".into();
    assert_eq!(workspace.save(&mut store), 11);

    let loaded = Workspace::load(&store);
    assert_eq!(loaded, workspace);
    std::fs::remove_dir_all(&dir).ok();
}

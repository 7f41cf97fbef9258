use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::BillingError;
use super::numeric::{Numeric, parse_numeric};
use super::types::LineItem;

const HUNDRED: Decimal = dec!(100);

/// Monetary breakdown of one line. Derived, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineComputation {
    /// Override rate if present, else list price.
    pub effective_rate: Decimal,
    /// quantity × effective rate.
    pub gross_amount: Decimal,
    pub discount_amount: Decimal,
    /// gross − discount.
    pub taxable_amount: Decimal,
    pub tax_amount: Decimal,
    /// taxable + tax.
    pub net_amount: Decimal,
}

/// Sums over all lines of an invoice.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceTotals {
    pub quantity: Decimal,
    /// Sum of gross amounts.
    pub amount: Decimal,
    pub discount: Decimal,
    pub taxable: Decimal,
    pub tax: Decimal,
    pub net: Decimal,
}

/// Compute one line's breakdown.
///
/// No rounding happens here; amounts are rounded only when formatted.
/// Arithmetic saturates instead of overflowing on absurd inputs.
pub fn compute_line(item: &LineItem) -> LineComputation {
    let effective_rate = item.rate.unwrap_or(item.list_price);
    let gross_amount = item.quantity.saturating_mul(effective_rate);
    let discount_amount = percent_of(gross_amount, item.discount_pct);
    let taxable_amount = gross_amount.saturating_sub(discount_amount);
    let tax_amount = percent_of(taxable_amount, item.tax_pct);
    let net_amount = taxable_amount.saturating_add(tax_amount);
    LineComputation {
        effective_rate,
        gross_amount,
        discount_amount,
        taxable_amount,
        tax_amount,
        net_amount,
    }
}

fn percent_of(base: Decimal, pct: Decimal) -> Decimal {
    base.saturating_mul(pct / HUNDRED)
}

/// Fold [`compute_line`] over `items` in input order.
pub fn aggregate<'a, I>(items: I) -> InvoiceTotals
where
    I: IntoIterator<Item = &'a LineItem>,
{
    items.into_iter().fold(InvoiceTotals::default(), |mut acc, item| {
        let line = compute_line(item);
        acc.quantity = acc.quantity.saturating_add(item.quantity);
        acc.amount = acc.amount.saturating_add(line.gross_amount);
        acc.discount = acc.discount.saturating_add(line.discount_amount);
        acc.taxable = acc.taxable.saturating_add(line.taxable_amount);
        acc.tax = acc.tax.saturating_add(line.tax_amount);
        acc.net = acc.net.saturating_add(line.net_amount);
        acc
    })
}

impl InvoiceTotals {
    /// Strictly read totals from stored JSON (e.g. an issued invoice record).
    ///
    /// Unlike line items, totals are produced by [`aggregate`]; a missing or
    /// non-numeric field means an upstream contract violation and is an error.
    pub fn from_value(value: &Value) -> Result<Self, BillingError> {
        let field = |name: &str| -> Result<Decimal, BillingError> {
            match value.get(name).map(parse_numeric) {
                Some(Numeric::Value(v)) => Ok(v),
                _ => Err(BillingError::Render(format!(
                    "totals field '{name}' is missing or not numeric"
                ))),
            }
        };
        Ok(Self {
            quantity: field("qty")?,
            amount: field("amount")?,
            discount: field("discount")?,
            taxable: field("taxable")?,
            tax: field("tax")?,
            net: field("net")?,
        })
    }

    /// JSON shape matching [`InvoiceTotals::from_value`].
    pub fn to_value(&self) -> Value {
        use super::numeric::decimal_to_json as n;
        serde_json::json!({
            "qty": n(self.quantity),
            "amount": n(self.amount),
            "discount": n(self.discount),
            "taxable": n(self.taxable),
            "tax": n(self.tax),
            "net": n(self.net),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn rate_override_wins() {
        let line = LineItem::new("A", dec!(2), dec!(100)).rate(dec!(80));
        assert_eq!(compute_line(&line).effective_rate, dec!(80));
        assert_eq!(compute_line(&line).gross_amount, dec!(160));
    }

    #[test]
    fn discount_then_tax() {
        let line = LineItem::new("A", dec!(2), dec!(100))
            .discount(dec!(10))
            .tax(dec!(18));
        let c = compute_line(&line);
        assert_eq!(c.gross_amount, dec!(200));
        assert_eq!(c.discount_amount, dec!(20));
        assert_eq!(c.taxable_amount, dec!(180));
        assert_eq!(c.tax_amount, dec!(32.4));
        assert_eq!(c.net_amount, dec!(212.4));
    }

    #[test]
    fn empty_aggregate_is_zero() {
        let totals = aggregate(&Vec::<LineItem>::new());
        assert_eq!(totals, InvoiceTotals::default());
    }

    #[test]
    fn saturates_instead_of_panicking() {
        let line = LineItem::new("Huge", Decimal::MAX, Decimal::MAX);
        let c = compute_line(&line);
        assert_eq!(c.gross_amount, Decimal::MAX);
    }

    #[test]
    fn totals_from_value_requires_every_field() {
        let ok = json!({"qty": 3, "amount": "10", "discount": 0, "taxable": 10, "tax": 1.8, "net": 11.8});
        assert_eq!(InvoiceTotals::from_value(&ok).unwrap().net, dec!(11.8));

        let missing = json!({"qty": 3, "amount": 10, "discount": 0, "taxable": 10, "tax": 1.8});
        let err = InvoiceTotals::from_value(&missing).unwrap_err();
        assert!(err.to_string().contains("net"));
    }

    #[test]
    fn totals_value_roundtrip() {
        let totals = aggregate(&[LineItem::new("A", dec!(3), dec!(12.5)).tax(dec!(5))]);
        assert_eq!(InvoiceTotals::from_value(&totals.to_value()).unwrap(), totals);
    }
}

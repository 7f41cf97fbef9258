//! Which optional columns appear in the rendered items table.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::compute::InvoiceTotals;
use super::types::LineItem;

/// Totals discount below this is treated as zero when deciding whether the
/// discount column is shown.
pub const DISCOUNT_VISIBILITY_EPSILON: Decimal = dec!(0.0001);

/// Operator overrides. `None` means "decide automatically".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ColumnPrefs {
    /// Show only the index and title columns; no totals.
    pub titles_only: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<bool>,
}

/// A toggleable column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    Discount,
    Tax,
    Amount,
}

/// Final column visibility after applying defaults and overrides.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedColumns {
    pub titles_only: bool,
    pub discount: bool,
    pub tax: bool,
    pub amount: bool,
}

impl ResolvedColumns {
    pub fn shows(&self, column: Column) -> bool {
        match column {
            Column::Discount => self.discount,
            Column::Tax => self.tax,
            Column::Amount => self.amount,
        }
    }
}

impl ColumnPrefs {
    /// Resolve visibility. Discount shows automatically when any line or the
    /// totals carry a discount; tax and amount show by default. Titles-only
    /// hides all three regardless of overrides.
    pub fn resolve<'a, I>(&self, items: I, totals: &InvoiceTotals) -> ResolvedColumns
    where
        I: IntoIterator<Item = &'a LineItem>,
    {
        if self.titles_only {
            return ResolvedColumns {
                titles_only: true,
                discount: false,
                tax: false,
                amount: false,
            };
        }
        let auto_discount = totals.discount.abs() > DISCOUNT_VISIBILITY_EPSILON
            || items.into_iter().any(|item| !item.discount_pct.is_zero());
        ResolvedColumns {
            titles_only: false,
            discount: self.discount.unwrap_or(auto_discount),
            tax: self.tax.unwrap_or(true),
            amount: self.amount.unwrap_or(true),
        }
    }

    /// Flip one column relative to what is currently `shown`.
    pub fn toggle(&mut self, column: Column, shown: &ResolvedColumns) {
        let next = !shown.shows(column);
        match column {
            Column::Discount => self.discount = Some(next),
            Column::Tax => self.tax = Some(next),
            Column::Amount => self.amount = Some(next),
        }
    }

    pub fn set_titles_only(&mut self, titles_only: bool) {
        self.titles_only = titles_only;
    }

    /// Drop every override.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn is_customized(&self) -> bool {
        *self != Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::compute::aggregate;

    fn lines(discount: Decimal) -> Vec<LineItem> {
        vec![LineItem::new("A", dec!(1), dec!(100)).discount(discount)]
    }

    #[test]
    fn discount_column_is_automatic() {
        let prefs = ColumnPrefs::default();
        let plain = lines(dec!(0));
        let resolved = prefs.resolve(&plain, &aggregate(&plain));
        assert!(!resolved.discount);
        assert!(resolved.tax && resolved.amount);

        let discounted = lines(dec!(5));
        assert!(prefs.resolve(&discounted, &aggregate(&discounted)).discount);
    }

    #[test]
    fn titles_only_hides_everything() {
        let prefs = ColumnPrefs {
            titles_only: true,
            tax: Some(true),
            ..ColumnPrefs::default()
        };
        let items = lines(dec!(5));
        let resolved = prefs.resolve(&items, &aggregate(&items));
        assert!(resolved.titles_only);
        assert!(!resolved.discount && !resolved.tax && !resolved.amount);
    }

    #[test]
    fn toggle_and_reset() {
        let items = lines(dec!(0));
        let totals = aggregate(&items);
        let mut prefs = ColumnPrefs::default();
        let shown = prefs.resolve(&items, &totals);
        prefs.toggle(Column::Tax, &shown);
        assert_eq!(prefs.tax, Some(false));
        assert!(prefs.is_customized());
        assert!(!prefs.resolve(&items, &totals).tax);

        prefs.reset();
        assert!(!prefs.is_customized());
    }

    #[test]
    fn wire_shape() {
        let prefs: ColumnPrefs = serde_json::from_str(r#"{"titlesOnly":true}"#).unwrap();
        assert!(prefs.titles_only);
        assert_eq!(serde_json::to_string(&ColumnPrefs::default()).unwrap(), r#"{"titlesOnly":false}"#);
    }
}

//! Indian-locale number formatting (`12,34,567.5`).
//!
//! At most two fraction digits, trailing zeros dropped, midpoints rounded
//! away from zero. The currency prefix is the literal `Rs ` rather than the
//! rupee glyph, which the built-in PDF fonts cannot render.

use rust_decimal::{Decimal, RoundingStrategy};

/// Literal currency prefix used in every rendered amount.
pub const CURRENCY_PREFIX: &str = "Rs ";

/// Format an amount as `Rs 1,23,456.78`.
pub fn format_inr(amount: Decimal) -> String {
    format!("{CURRENCY_PREFIX}{}", format_indian(amount))
}

/// Format a quantity with Indian digit grouping and no prefix.
pub fn format_quantity(quantity: Decimal) -> String {
    format_indian(quantity)
}

/// Format a percentage cell without grouping (`12.5`).
pub fn format_percent(pct: Decimal) -> String {
    let rounded = round_display(pct);
    if rounded.is_zero() {
        "0".to_string()
    } else {
        rounded.to_string()
    }
}

fn round_display(value: Decimal) -> Decimal {
    value
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
        .normalize()
}

fn format_indian(value: Decimal) -> String {
    let rounded = round_display(value);
    if rounded.is_zero() {
        return "0".to_string();
    }
    let text = rounded.abs().to_string();
    let (whole, fraction) = match text.split_once('.') {
        Some((w, f)) => (w, Some(f)),
        None => (text.as_str(), None),
    };

    let mut out = String::with_capacity(text.len() + 8);
    if rounded.is_sign_negative() {
        out.push('-');
    }
    out.push_str(&group_indian(whole));
    if let Some(fraction) = fraction {
        out.push('.');
        out.push_str(fraction);
    }
    out
}

/// Insert separators: last three digits, then groups of two.
fn group_indian(digits: &str) -> String {
    if digits.len() <= 3 {
        return digits.to_string();
    }
    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut groups: Vec<&str> = Vec::new();
    let mut end = head.len();
    while end > 0 {
        let start = end.saturating_sub(2);
        groups.push(&head[start..end]);
        end = start;
    }
    groups.reverse();
    format!("{},{}", groups.join(","), tail)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn grouping() {
        assert_eq!(format_quantity(dec!(0)), "0");
        assert_eq!(format_quantity(dec!(999)), "999");
        assert_eq!(format_quantity(dec!(1000)), "1,000");
        assert_eq!(format_quantity(dec!(100000)), "1,00,000");
        assert_eq!(format_quantity(dec!(1234567)), "12,34,567");
        assert_eq!(format_quantity(dec!(123456789)), "12,34,56,789");
    }

    #[test]
    fn fraction_digits() {
        assert_eq!(format_inr(dec!(212.4)), "Rs 212.4");
        assert_eq!(format_inr(dec!(100.00)), "Rs 100");
        assert_eq!(format_inr(dec!(1234567.505)), "Rs 12,34,567.51");
        assert_eq!(format_inr(dec!(0.004)), "Rs 0");
    }

    #[test]
    fn negatives() {
        assert_eq!(format_inr(dec!(-1234.5)), "Rs -1,234.5");
        assert_eq!(format_inr(dec!(-0.001)), "Rs 0");
    }

    #[test]
    fn percents() {
        assert_eq!(format_percent(dec!(18)), "18");
        assert_eq!(format_percent(dec!(12.50)), "12.5");
        assert_eq!(format_percent(dec!(0)), "0");
    }
}

//! Lenient numeric and text coercion.
//!
//! Spreadsheet exports and hand-edited form fields carry numbers as JSON
//! numbers, numeric strings, blanks, or garbage. Every numeric field in this
//! crate goes through [`parse_numeric`] and falls back to its default when
//! the input is absent or unusable. Nothing here returns an error.

use std::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Outcome of reading one raw numeric cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Numeric {
    /// Field absent or `null`.
    Missing,
    /// Present but empty / whitespace only.
    Blank,
    /// A finite number.
    Value(Decimal),
    /// Present but not a number.
    Invalid,
}

impl Numeric {
    /// The parsed value, or `default` for anything else.
    pub fn or(self, default: Decimal) -> Decimal {
        match self {
            Self::Value(v) => v,
            _ => default,
        }
    }

    /// True when the cell carried something other than blank/null.
    pub fn is_present(self) -> bool {
        matches!(self, Self::Value(_) | Self::Invalid)
    }
}

/// Parse a numeric string the way a spreadsheet cell is read: surrounding
/// whitespace ignored, plain or scientific notation accepted.
pub fn parse_numeric_str(text: &str) -> Numeric {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Numeric::Blank;
    }
    // rust_decimal tolerates `_` separators; spreadsheet numbers never carry them
    if trimmed.contains('_') {
        return Numeric::Invalid;
    }
    // one leading sign at most
    let digits = trimmed.strip_prefix(['+', '-']).unwrap_or(trimmed);
    if digits.starts_with(['+', '-']) {
        return Numeric::Invalid;
    }
    let unsigned = trimmed.strip_prefix('+').unwrap_or(trimmed);
    let parsed = match Decimal::from_str(unsigned) {
        Ok(v) => Some(v),
        Err(_) if unsigned.contains(['e', 'E']) => Decimal::from_scientific(unsigned)
            .ok()
            .or_else(|| out_of_range(unsigned)),
        Err(_) => None,
    };
    match parsed {
        Some(v) => Numeric::Value(v.normalize()),
        None => Numeric::Invalid,
    }
}

/// Finite numbers beyond `Decimal`'s range or precision: magnitudes below
/// one read as zero, larger ones clamp to `Decimal::MAX`/`MIN`.
fn out_of_range(text: &str) -> Option<Decimal> {
    let f = f64::from_str(text).ok().filter(|f| f.is_finite())?;
    Some(if f.abs() < 1.0 {
        Decimal::ZERO
    } else if f > 0.0 {
        Decimal::MAX
    } else {
        Decimal::MIN
    })
}

/// Classify a JSON value as a number.
pub fn parse_numeric(value: &Value) -> Numeric {
    match value {
        Value::Null => Numeric::Missing,
        Value::Bool(b) => Numeric::Value(if *b { Decimal::ONE } else { Decimal::ZERO }),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Numeric::Value(Decimal::from(i))
            } else if let Some(u) = n.as_u64() {
                Numeric::Value(Decimal::from(u))
            } else {
                parse_numeric_str(&n.to_string())
            }
        }
        Value::String(s) => parse_numeric_str(s),
        Value::Array(_) | Value::Object(_) => Numeric::Invalid,
    }
}

/// Read an optional JSON value as a number, falling back to `default`.
pub fn coerce(value: Option<&Value>, default: Decimal) -> Decimal {
    value.map(parse_numeric).unwrap_or(Numeric::Missing).or(default)
}

/// Render a JSON scalar as trimmed text. Numbers keep their shortest form
/// (`1001`, not `1001.0`); `null`, arrays, and objects become empty.
pub fn text_of(value: &Value) -> String {
    match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null | Value::Array(_) | Value::Object(_) => String::new(),
    }
}

/// Convert a decimal into a JSON number for wire formats that expect one.
pub fn decimal_to_json(value: Decimal) -> Value {
    let normalized = value.normalize();
    if normalized.scale() == 0 {
        if let Some(i) = normalized.to_i64() {
            return Value::from(i);
        }
    }
    serde_json::Number::from_str(&normalized.to_string())
        .map(Value::Number)
        .unwrap_or_else(|_| Value::String(normalized.to_string()))
}

// ── serde field helpers ─────────────────────────────────────────────────────

pub(crate) fn one() -> Decimal {
    Decimal::ONE
}

/// Numeric field defaulting to zero.
pub(crate) fn de_decimal<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(parse_numeric(&value).or(Decimal::ZERO))
}

/// Quantity: defaults to one when absent, blank, or non-numeric.
pub(crate) fn de_quantity<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(parse_numeric(&value).or(Decimal::ONE))
}

/// Override price: blank means "no override"; garbage reads as zero.
pub(crate) fn de_rate<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match parse_numeric(&value) {
        Numeric::Value(v) => Some(v),
        Numeric::Invalid => Some(Decimal::ZERO),
        Numeric::Missing | Numeric::Blank => None,
    })
}

/// Optional number where anything unparseable means "not set".
pub(crate) fn de_opt_decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match parse_numeric(&value) {
        Numeric::Value(v) => Some(v),
        _ => None,
    })
}

pub(crate) fn de_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(text_of(&value))
}

pub(crate) fn de_opt_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let text = text_of(&value);
    Ok((!text.is_empty()).then_some(text))
}

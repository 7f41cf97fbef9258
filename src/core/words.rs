//! Amounts in words using the Indian numbering system
//! (thousand, lakh, crore, arab, kharab).

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

const BELOW_TWENTY: [&str; 20] = [
    "Zero",
    "One",
    "Two",
    "Three",
    "Four",
    "Five",
    "Six",
    "Seven",
    "Eight",
    "Nine",
    "Ten",
    "Eleven",
    "Twelve",
    "Thirteen",
    "Fourteen",
    "Fifteen",
    "Sixteen",
    "Seventeen",
    "Eighteen",
    "Nineteen",
];

const TENS: [&str; 10] = [
    "", "", "Twenty", "Thirty", "Forty", "Fifty", "Sixty", "Seventy", "Eighty", "Ninety",
];

/// Magnitude labels. The first group spans three digits, every later group two.
const INDIAN_UNITS: [&str; 6] = ["", "Thousand", "Lakh", "Crore", "Arab", "Kharab"];

fn below_thousand(n: u128) -> String {
    debug_assert!(n < 1000);
    let mut parts: Vec<String> = Vec::with_capacity(2);
    let mut value = n;
    if value >= 100 {
        parts.push(format!("{} Hundred", BELOW_TWENTY[(value / 100) as usize]));
        value %= 100;
    }
    if value >= 20 {
        let ten = TENS[(value / 10) as usize];
        match value % 10 {
            0 => parts.push(ten.to_string()),
            r => parts.push(format!("{ten} {}", BELOW_TWENTY[r as usize])),
        }
    } else if value > 0 {
        parts.push(BELOW_TWENTY[value as usize].to_string());
    }
    parts.join(" ")
}

/// Spell out a non-negative integer, e.g. `1234567` →
/// "Twelve Lakh Thirty Four Thousand Five Hundred Sixty Seven".
///
/// Counts beyond 99 kharab are spelled recursively in front of "Kharab".
pub fn number_to_words(n: u128) -> String {
    if n == 0 {
        return BELOW_TWENTY[0].to_string();
    }
    let last = INDIAN_UNITS.len() - 1;
    let mut remainder = n;
    let mut words: Vec<String> = Vec::new();
    for (index, label) in INDIAN_UNITS.iter().enumerate() {
        if remainder == 0 {
            break;
        }
        let chunk = if index == last {
            std::mem::take(&mut remainder)
        } else {
            let divisor = if index == 0 { 1000 } else { 100 };
            let chunk = remainder % divisor;
            remainder /= divisor;
            chunk
        };
        if chunk == 0 {
            continue;
        }
        let chunk_words = if chunk < 1000 {
            below_thousand(chunk)
        } else {
            number_to_words(chunk)
        };
        if label.is_empty() {
            words.push(chunk_words);
        } else {
            words.push(format!("{chunk_words} {label}"));
        }
    }
    words.reverse();
    words.join(" ")
}

/// Rupees-and-paise phrase for an amount, e.g. `-42` → "Minus Forty Two Rupees Only".
///
/// The amount is rounded to the nearest paisa first; a zero rupee part still
/// reads "Zero Rupees".
pub fn amount_in_words(amount: Decimal) -> String {
    let negative = amount.is_sign_negative() && !amount.is_zero();
    let paise_total = amount
        .abs()
        .saturating_mul(dec!(100))
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_u128()
        .unwrap_or(0);
    let rupees = paise_total / 100;
    let paise = paise_total % 100;

    let mut parts = Vec::with_capacity(2);
    if rupees > 0 {
        let unit = if rupees == 1 { "Rupee" } else { "Rupees" };
        parts.push(format!("{} {unit}", number_to_words(rupees)));
    } else {
        parts.push("Zero Rupees".to_string());
    }
    if paise > 0 {
        let unit = if paise == 1 { "Paisa" } else { "Paise" };
        parts.push(format!("{} {unit}", number_to_words(paise)));
    }

    let phrase = parts.join(" and ");
    if negative && paise_total > 0 {
        format!("Minus {phrase} Only")
    } else {
        format!("{phrase} Only")
    }
}

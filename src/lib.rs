//! # billbook
//!
//! Invoice toolkit for a small book publisher: catalog and customer
//! normalization, line/aggregate totals, Indian-numbering amounts in words,
//! paginated PDF invoices (single or batched), and local-first state that
//! reconciles with a remote REST store.
//!
//! All monetary values use [`rust_decimal::Decimal`], not floating point.
//! Malformed numeric input never fails: it falls back to the field default.
//!
//! ## Quick Start
//!
//! ```rust
//! use billbook::core::*;
//! use rust_decimal_macros::dec;
//!
//! let lines = vec![
//!     LineItem::new("Kannada Grammar", dec!(2), dec!(100)).discount(dec!(10)).tax(dec!(18)),
//!     LineItem::new("Folk Tales", dec!(1), dec!(50)).tax(dec!(18)),
//!     LineItem::new("Poems", dec!(5), dec!(20)).discount(dec!(5)),
//! ];
//!
//! let totals = aggregate(&lines);
//! assert_eq!(totals.net, dec!(366.4));
//! assert_eq!(format_inr(totals.net), "Rs 366.4");
//! assert_eq!(
//!     amount_in_words(totals.net),
//!     "Three Hundred Sixty Six Rupees and Forty Paise Only"
//! );
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `core` | Line computation, totals, formatting, normalization, drafts, local persistence |
//! | `pdf` | Invoice layout, PDF rendering, batch generation |
//! | `sync` | Remote REST store client and local-first reconciler |
//! | `all` | Everything (also the default) |

#[cfg(feature = "core")]
pub mod core;

#[cfg(feature = "pdf")]
pub mod render;

#[cfg(feature = "sync")]
pub mod sync;

// Re-export core types at crate root for convenience
#[cfg(feature = "core")]
pub use crate::core::*;

//! # Data Normalization
//!
//! Coerces the loosely-typed fields of upstream records into the values the
//! aggregation engine reads. Every function here is total: malformed input
//! degrades to a neutral value (`0.0`, `None`, `false`) instead of failing, so
//! one bad row contributes nothing rather than poisoning a whole aggregate.

pub mod amount;
pub mod text;
pub mod timestamp;

pub use amount::{normalize_amount, normalize_count, normalize_flag};
pub use text::{normalize_id, normalize_text};
pub use timestamp::parse_timestamp;

//! Sample-based inference of column types and header position.
//!
//! Both guessers only ever look at the rows they are given, normally
//! [`crate::rowset::RowSet::sample`], so their cost is bounded by the sample window no
//! matter how large the source is.

pub mod headers;
pub mod types;

pub use headers::{column_count_modal, headers_guess};
pub use types::{type_guess, GUESS_ORDER};

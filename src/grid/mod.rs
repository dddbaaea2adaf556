//! Coefficient grid construction.
//!
//! A single pass over the parsed rows: validate indices, fill the fixed 6×3
//! tables, and collect the old-vs-new pairs used by the comparison listing.

pub mod builder;

pub use builder::*;

//! Rendering: array literals, comparison listing, dataset previews.
//!
//! We keep formatting code in one place so:
//! - grid construction stays clean and testable
//! - output changes are localized (the emitted text is pasted verbatim into
//!   firmware source, so its exact shape matters)

pub mod format;

pub use format::*;

//! Input/output helpers.
//!
//! - comparison-CSV ingest + validation (`ingest`)
//! - rendered-text and grid JSON exports (`export`)
//! - workbook-to-CSV extraction (`extract`)

pub mod export;
pub mod extract;
pub mod ingest;

pub use export::*;
pub use extract::*;
pub use ingest::*;

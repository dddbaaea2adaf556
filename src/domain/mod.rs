//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the fixed grid geometry (`RANGE_COUNT`, `ANCHOR_COUNT`, `RANGE_LABELS`)
//! - the coefficient families and their defaults/precision (`Family`)
//! - parsed input rows (`CoeffRow`) and built grids (`CoeffGrid`, `GridSet`)
//! - run configuration (`EmitConfig`)

pub mod types;

pub use types::*;

//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory while building the coefficient grids
//! - exported to JSON for downstream tooling
//! - compared against older firmware generations in reports

use std::path::PathBuf;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Number of distance bands in the correction tables.
pub const RANGE_COUNT: usize = 6;

/// Number of anchors the tag ranges against.
pub const ANCHOR_COUNT: usize = 3;

/// Human-readable labels for the six distance bands, by range index.
///
/// These match the comments in the firmware's `regression.h` and are used in
/// the comparison listing.
pub const RANGE_LABELS: [&str; RANGE_COUNT] = [
    "10-50cm", "50-100cm", "100-500cm", "500-1k", "1k-3k", "3k+",
];

/// Label for a range index, or a fallback for out-of-table values.
///
/// Only reports call this; grid construction validates indices before any
/// lookup happens.
pub fn range_label(range_index: usize) -> &'static str {
    RANGE_LABELS.get(range_index).copied().unwrap_or("?")
}

/// One regression coefficient family.
///
/// Each family has its own fixed 6×3 table in the firmware, its own default
/// sentinel (the value a cell keeps when no calibration row covers it), and
/// its own output precision. The tiered precision mirrors how sensitive each
/// term is to rounding: the quadratic term is multiplied by `x²` with `x` in
/// centimeters, so it needs far more fractional digits than the intercept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Family {
    LinearA,
    LinearB,
    PolyP0,
    PolyP1,
    PolyP2,
}

impl Family {
    /// All families, in firmware declaration order.
    pub const ALL: [Family; 5] = [
        Family::LinearA,
        Family::LinearB,
        Family::PolyP0,
        Family::PolyP1,
        Family::PolyP2,
    ];

    /// Base array identifier in the emitted C source (before any suffix).
    pub fn array_name(self) -> &'static str {
        match self {
            Family::LinearA => "LINEAR_A",
            Family::LinearB => "LINEAR_B",
            Family::PolyP0 => "POLY_P0",
            Family::PolyP1 => "POLY_P1",
            Family::PolyP2 => "POLY_P2",
        }
    }

    /// Default sentinel for cells no calibration row covers.
    ///
    /// 3000.0 for the constant terms means "report the out-of-band ceiling
    /// (3000 cm)"; the slope/higher-order defaults of 0.0 make the fallback
    /// prediction constant.
    pub fn default_value(self) -> f64 {
        match self {
            Family::LinearA | Family::PolyP0 => 3000.0,
            Family::LinearB | Family::PolyP1 | Family::PolyP2 => 0.0,
        }
    }

    /// Fractional digits used when rendering this family's array literal.
    pub fn precision(self) -> usize {
        match self {
            Family::LinearA | Family::PolyP0 => 6,
            Family::LinearB | Family::PolyP1 => 12,
            Family::PolyP2 => 18,
        }
    }
}

/// A parsed row of the comparison CSV (coefficients mostly optional).
///
/// Index fields are kept as raw `i64` here; bounds are checked by the grid
/// builder so that a bad index aborts the run instead of being clipped.
#[derive(Debug, Clone)]
pub struct CoeffRow {
    /// 1-based CSV line this row came from (for error messages).
    pub line: usize,

    pub range_index: i64,
    pub anchor_index: i64,

    /// Anchor label as written in the sheet (e.g. `A1`).
    pub anchor: Option<String>,

    pub linear_a: Option<f64>,
    pub linear_b: Option<f64>,
    pub poly_p0: Option<f64>,
    pub poly_p1: Option<f64>,
    pub poly_p2: Option<f64>,

    /// Previous-generation values, only used for the comparison listing.
    pub old_linear_a: Option<f64>,
    pub old_poly_p0: Option<f64>,
}

impl CoeffRow {
    /// The row's value for one family, if present.
    pub fn value(&self, family: Family) -> Option<f64> {
        match family {
            Family::LinearA => self.linear_a,
            Family::LinearB => self.linear_b,
            Family::PolyP0 => self.poly_p0,
            Family::PolyP1 => self.poly_p1,
            Family::PolyP2 => self.poly_p2,
        }
    }

    /// A row only updates the grids when every family has a value.
    pub fn is_complete(&self) -> bool {
        Family::ALL.iter().all(|f| self.value(*f).is_some())
    }

    /// Anchor label for reports, falling back to `A<n>` from the index.
    pub fn anchor_label(&self) -> String {
        match &self.anchor {
            Some(label) => label.clone(),
            None => format!("A{}", self.anchor_index + 1),
        }
    }
}

/// One family's fixed 6×3 coefficient table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CoeffGrid(pub [[f64; ANCHOR_COUNT]; RANGE_COUNT]);

impl CoeffGrid {
    /// A grid with every cell set to `value`.
    pub fn filled(value: f64) -> Self {
        CoeffGrid([[value; ANCHOR_COUNT]; RANGE_COUNT])
    }

    pub fn get(&self, range_index: usize, anchor_index: usize) -> f64 {
        self.0[range_index][anchor_index]
    }

    pub fn set(&mut self, range_index: usize, anchor_index: usize, value: f64) {
        self.0[range_index][anchor_index] = value;
    }
}

/// The five coefficient grids of one firmware generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridSet {
    pub linear_a: CoeffGrid,
    pub linear_b: CoeffGrid,
    pub poly_p0: CoeffGrid,
    pub poly_p1: CoeffGrid,
    pub poly_p2: CoeffGrid,
}

impl GridSet {
    /// Grids pre-filled with each family's default sentinel.
    pub fn with_defaults() -> Self {
        GridSet {
            linear_a: CoeffGrid::filled(Family::LinearA.default_value()),
            linear_b: CoeffGrid::filled(Family::LinearB.default_value()),
            poly_p0: CoeffGrid::filled(Family::PolyP0.default_value()),
            poly_p1: CoeffGrid::filled(Family::PolyP1.default_value()),
            poly_p2: CoeffGrid::filled(Family::PolyP2.default_value()),
        }
    }

    pub fn grid(&self, family: Family) -> &CoeffGrid {
        match family {
            Family::LinearA => &self.linear_a,
            Family::LinearB => &self.linear_b,
            Family::PolyP0 => &self.poly_p0,
            Family::PolyP1 => &self.poly_p1,
            Family::PolyP2 => &self.poly_p2,
        }
    }

    pub fn grid_mut(&mut self, family: Family) -> &mut CoeffGrid {
        match family {
            Family::LinearA => &mut self.linear_a,
            Family::LinearB => &mut self.linear_b,
            Family::PolyP0 => &mut self.poly_p0,
            Family::PolyP1 => &mut self.poly_p1,
            Family::PolyP2 => &mut self.poly_p2,
        }
    }
}

/// Old-vs-new values for one calibrated cell (comparison listing).
#[derive(Debug, Clone)]
pub struct Comparison {
    pub range_index: usize,
    pub anchor: String,
    pub old_linear_a: Option<f64>,
    pub new_linear_a: f64,
    pub old_poly_p0: Option<f64>,
    pub new_poly_p0: f64,
}

/// A saved grid file (JSON).
///
/// The portable representation of a built coefficient generation, for
/// downstream tooling that wants the numbers without re-parsing C source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoeffFile {
    pub tool: String,
    pub generated: chrono::DateTime<chrono::Local>,
    pub label: Option<String>,
    pub source: String,
    pub grids: GridSet,
}

/// A full `calib emit` run's configuration, derived from CLI flags.
#[derive(Debug, Clone)]
pub struct EmitConfig {
    pub csv_path: PathBuf,

    /// Firmware generation label shown in the banner (e.g. `v3.0.8`).
    pub label: Option<String>,

    /// Suffix appended to array identifiers (`LINEAR_A_<suffix>`); empty
    /// disables it.
    pub suffix: String,

    /// Emit only this family's block.
    pub only: Option<Family>,

    /// Render the old-vs-new comparison listing.
    pub compare: bool,

    /// Also write the rendered text to this file.
    pub export: Option<PathBuf>,

    /// Also write the built grids as JSON to this file.
    pub export_json: Option<PathBuf>,
}

//! Command-line parsing for the calibration coefficient tool.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the grid/formatting code.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::domain::Family;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "calib",
    version,
    about = "UWB ranging calibration coefficient tables"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Build the 6x3 coefficient tables from a comparison CSV and print them
    /// as C array literals ready to paste into the tag firmware.
    Emit(EmitArgs),
    /// Print a quick summary of a CSV dataset (shape, columns, first rows).
    Inspect(InspectArgs),
    /// Extract sheets of a calibration workbook (.xlsx) to CSV files.
    Extract(ExtractArgs),
}

/// Options for building and emitting the coefficient tables.
#[derive(Debug, Parser, Clone)]
pub struct EmitArgs {
    /// Comparison CSV: one row per calibrated (range, anchor) cell.
    pub csv: PathBuf,

    /// Firmware generation label shown in the banner (e.g. v3.0.8).
    #[arg(long)]
    pub label: Option<String>,

    /// Suffix appended to array identifiers (LINEAR_A_<SUFFIX>); pass an
    /// empty string to emit bare names.
    #[arg(long, default_value = "NEW")]
    pub suffix: String,

    /// Emit only one family's array block.
    #[arg(long, value_enum)]
    pub only: Option<Family>,

    /// Skip the old-vs-new comparison listing.
    #[arg(long)]
    pub no_compare: bool,

    /// Also write the rendered output to a file.
    #[arg(long)]
    pub export: Option<PathBuf>,

    /// Also write the built grids as JSON.
    #[arg(long = "export-json")]
    pub export_json: Option<PathBuf>,
}

/// Options for previewing a CSV dataset.
#[derive(Debug, Parser)]
pub struct InspectArgs {
    /// CSV file to summarize.
    pub csv: PathBuf,

    /// Number of leading rows to print.
    #[arg(long, default_value_t = 10)]
    pub rows: usize,
}

/// Options for extracting a workbook to CSV files.
#[derive(Debug, Parser)]
pub struct ExtractArgs {
    /// Calibration workbook (.xlsx).
    pub workbook: PathBuf,

    /// Directory the per-sheet CSV files are written to.
    #[arg(long, default_value = ".")]
    pub out_dir: PathBuf,

    /// Extract only this sheet.
    #[arg(long)]
    pub sheet: Option<String>,
}

//! Comparison-CSV ingest and normalization.
//!
//! This module turns a calibration comparison CSV into `CoeffRow`s that are
//! safe to hand to the grid builder.
//!
//! Design goals:
//! - **Strict schema** for required columns (clear errors + exit code 2)
//! - **Row-level validation** (skip bad rows, but report what happened)
//! - **Deterministic behavior** (no hidden coercions beyond what is listed)
//! - **Separation of concerns**: no grid logic here

use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

use csv::StringRecord;

use crate::domain::CoeffRow;
use crate::error::AppError;

/// Header aliases per logical column. Sheets exported at different times name
/// the index/coefficient columns slightly differently; we accept the variants
/// that have actually shown up.
const RANGE_ALIASES: [&str; 3] = ["range", "range_idx", "range_index"];
const ANCHOR_IDX_ALIASES: [&str; 2] = ["anchor_idx", "anchor_index"];
const LINEAR_A_ALIASES: [&str; 3] = ["new_lin_a", "lin_a", "linear_a"];
const LINEAR_B_ALIASES: [&str; 3] = ["new_lin_b", "lin_b", "linear_b"];
const POLY_P0_ALIASES: [&str; 2] = ["new_poly_p0", "poly_p0"];
const POLY_P1_ALIASES: [&str; 2] = ["new_poly_p1", "poly_p1"];
const POLY_P2_ALIASES: [&str; 2] = ["new_poly_p2", "poly_p2"];
const OLD_LINEAR_A_ALIASES: [&str; 2] = ["old_lin_a", "old_linear_a"];
const OLD_POLY_P0_ALIASES: [&str; 1] = ["old_poly_p0"];

/// A row-level error encountered during ingest.
#[derive(Debug, Clone)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

/// Ingest output: parsed rows + row errors + counts for the summary.
#[derive(Debug, Clone)]
pub struct IngestedData {
    pub rows: Vec<CoeffRow>,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
    /// Rows carrying all five coefficients (the ones the builder will apply).
    pub rows_complete: usize,
}

/// Load and parse the comparison CSV into `CoeffRow`s.
pub fn load_coeff_rows(path: &Path) -> Result<IngestedData, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::input(format!("Failed to open CSV '{}': {e}", path.display())))?;

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(file);

    let headers = reader
        .headers()
        .map_err(|e| AppError::input(format!("Failed to read CSV headers: {e}")))?
        .clone();

    let header_map = build_header_map(&headers);
    let columns = Columns::resolve(&header_map)?;

    let mut rows = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (idx, result) in reader.records().enumerate() {
        // +2 because:
        // - records() starts at line 1 after headers
        // - CSV is 1-based line numbers
        let line = idx + 2;
        rows_read += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                row_errors.push(RowError {
                    line,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };

        match parse_row(&record, &columns, line) {
            Ok(row) => rows.push(row),
            Err(message) => row_errors.push(RowError { line, message }),
        }
    }

    if rows.is_empty() {
        return Err(AppError::empty(format!(
            "No usable rows in '{}' ({} read, {} rejected).",
            path.display(),
            rows_read,
            row_errors.len()
        )));
    }

    let rows_complete = rows.iter().filter(|r| r.is_complete()).count();

    Ok(IngestedData {
        rows,
        row_errors,
        rows_read,
        rows_complete,
    })
}

/// Resolved column indices for the run.
#[derive(Debug, Clone)]
struct Columns {
    range: usize,
    anchor_idx: usize,
    anchor: Option<usize>,
    linear_a: usize,
    linear_b: usize,
    poly_p0: usize,
    poly_p1: usize,
    poly_p2: usize,
    old_linear_a: Option<usize>,
    old_poly_p0: Option<usize>,
}

impl Columns {
    fn resolve(header_map: &HashMap<String, usize>) -> Result<Self, AppError> {
        Ok(Columns {
            range: require_column(header_map, &RANGE_ALIASES)?,
            anchor_idx: require_column(header_map, &ANCHOR_IDX_ALIASES)?,
            anchor: find_column(header_map, &["anchor"]),
            linear_a: require_column(header_map, &LINEAR_A_ALIASES)?,
            linear_b: require_column(header_map, &LINEAR_B_ALIASES)?,
            poly_p0: require_column(header_map, &POLY_P0_ALIASES)?,
            poly_p1: require_column(header_map, &POLY_P1_ALIASES)?,
            poly_p2: require_column(header_map, &POLY_P2_ALIASES)?,
            old_linear_a: find_column(header_map, &OLD_LINEAR_A_ALIASES),
            old_poly_p0: find_column(header_map, &OLD_POLY_P0_ALIASES),
        })
    }
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Excel and other tools sometimes emit UTF-8 CSVs with a BOM prefix on the
    // first header (e.g. "﻿range"). If we don't strip it, schema validation
    // will incorrectly report missing columns.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

fn find_column(header_map: &HashMap<String, usize>, aliases: &[&str]) -> Option<usize> {
    aliases.iter().find_map(|name| header_map.get(*name).copied())
}

fn require_column(header_map: &HashMap<String, usize>, aliases: &[&str]) -> Result<usize, AppError> {
    find_column(header_map, aliases).ok_or_else(|| {
        AppError::input(format!(
            "Missing required column: `{}` (accepted names: {}).",
            aliases[0],
            aliases.join(", ")
        ))
    })
}

fn parse_row(record: &StringRecord, columns: &Columns, line: usize) -> Result<CoeffRow, String> {
    let range_index = parse_index(get_required(record, columns.range, "range")?)
        .map_err(|e| format!("Invalid `range` value: {e}"))?;
    let anchor_index = parse_index(get_required(record, columns.anchor_idx, "anchor_idx")?)
        .map_err(|e| format!("Invalid `anchor_idx` value: {e}"))?;

    let anchor = columns
        .anchor
        .and_then(|idx| get_optional(record, idx))
        .map(str::to_string);

    Ok(CoeffRow {
        line,
        range_index,
        anchor_index,
        anchor,
        linear_a: parse_opt_f64(get_optional(record, columns.linear_a)),
        linear_b: parse_opt_f64(get_optional(record, columns.linear_b)),
        poly_p0: parse_opt_f64(get_optional(record, columns.poly_p0)),
        poly_p1: parse_opt_f64(get_optional(record, columns.poly_p1)),
        poly_p2: parse_opt_f64(get_optional(record, columns.poly_p2)),
        old_linear_a: parse_opt_f64(columns.old_linear_a.and_then(|idx| get_optional(record, idx))),
        old_poly_p0: parse_opt_f64(columns.old_poly_p0.and_then(|idx| get_optional(record, idx))),
    })
}

fn get_required<'a>(record: &'a StringRecord, idx: usize, name: &str) -> Result<&'a str, String> {
    record
        .get(idx)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| format!("Missing required value: `{name}`"))
}

fn get_optional(record: &StringRecord, idx: usize) -> Option<&str> {
    record.get(idx).map(str::trim).filter(|s| !s.is_empty())
}

/// Parse an index column that spreadsheet exports may have written as either
/// an integer (`2`) or a float (`2.0`).
fn parse_index(s: &str) -> Result<i64, String> {
    if let Ok(v) = s.parse::<i64>() {
        return Ok(v);
    }
    if let Ok(v) = s.parse::<f64>() {
        if v.is_finite() && v.fract() == 0.0 {
            return Ok(v as i64);
        }
        return Err(format!("'{s}' is not an integer"));
    }
    Err(format!("'{s}' is not a number"))
}

fn parse_opt_f64(s: Option<&str>) -> Option<f64> {
    let s = s?;
    let v = s.parse::<f64>().ok()?;
    if v.is_finite() { Some(v) } else { None }
}

/// Head-of-file view of an arbitrary CSV (for `calib inspect`).
#[derive(Debug, Clone)]
pub struct CsvPreview {
    pub columns: Vec<String>,
    /// Up to the requested number of leading data rows, as raw strings.
    pub rows: Vec<Vec<String>>,
    pub total_rows: usize,
}

/// Read shape, column names, and the first `max_rows` rows of a CSV.
pub fn load_preview(path: &Path, max_rows: usize) -> Result<CsvPreview, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::input(format!("Failed to open CSV '{}': {e}", path.display())))?;

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(file);

    let columns: Vec<String> = reader
        .headers()
        .map_err(|e| AppError::input(format!("Failed to read CSV headers: {e}")))?
        .iter()
        .map(|h| normalize_header_name(h))
        .collect();

    let mut rows = Vec::new();
    let mut total_rows = 0usize;

    for result in reader.records() {
        let record =
            result.map_err(|e| AppError::input(format!("CSV parse error: {e}")))?;
        total_rows += 1;
        if rows.len() < max_rows {
            rows.push(record.iter().map(str::to_string).collect());
        }
    }

    Ok(CsvPreview {
        columns,
        rows,
        total_rows,
    })
}

//! Build the per-family coefficient grids from parsed CSV rows.
//!
//! Semantics:
//!
//! - grids start out filled with each family's default sentinel
//! - a row updates the grids only if **all five** coefficients are present;
//!   otherwise it is skipped whole (a partial row must not touch any table)
//! - rows are applied in input order; duplicate `(range, anchor)` keys are
//!   last-write-wins
//! - index bounds are validated for every row **before** any cell is written,
//!   so a bad index aborts the run instead of emitting a half-built table

use log::warn;

use crate::domain::{ANCHOR_COUNT, CoeffRow, Comparison, GridSet, RANGE_COUNT};
use crate::error::AppError;

/// Build output: the grids plus bookkeeping for the run summary.
#[derive(Debug, Clone)]
pub struct BuildOutput {
    pub grids: GridSet,
    /// One entry per applied row, in input order.
    pub comparisons: Vec<Comparison>,
    pub rows_used: usize,
    pub rows_skipped: usize,
}

/// Build the five coefficient grids from parsed rows.
pub fn build_grids(rows: &[CoeffRow]) -> Result<BuildOutput, AppError> {
    // Fail fast on any out-of-range index, including rows that would later be
    // skipped for missing coefficients. A bad index means the sheet layout
    // shifted, and silently dropping or clipping it would corrupt the tables.
    for row in rows {
        validate_indices(row)?;
    }

    let mut grids = GridSet::with_defaults();
    let mut comparisons = Vec::new();
    let mut rows_used = 0usize;
    let mut rows_skipped = 0usize;

    for row in rows {
        let (Some(linear_a), Some(linear_b), Some(poly_p0), Some(poly_p1), Some(poly_p2)) =
            (row.linear_a, row.linear_b, row.poly_p0, row.poly_p1, row.poly_p2)
        else {
            rows_skipped += 1;
            warn!(
                "line {}: row (range {}, anchor {}) is missing coefficient values; grids unchanged",
                row.line, row.range_index, row.anchor_index
            );
            continue;
        };

        let range = row.range_index as usize;
        let anchor = row.anchor_index as usize;

        grids.linear_a.set(range, anchor, linear_a);
        grids.linear_b.set(range, anchor, linear_b);
        grids.poly_p0.set(range, anchor, poly_p0);
        grids.poly_p1.set(range, anchor, poly_p1);
        grids.poly_p2.set(range, anchor, poly_p2);

        comparisons.push(Comparison {
            range_index: range,
            anchor: row.anchor_label(),
            old_linear_a: row.old_linear_a,
            new_linear_a: linear_a,
            old_poly_p0: row.old_poly_p0,
            new_poly_p0: poly_p0,
        });
        rows_used += 1;
    }

    Ok(BuildOutput {
        grids,
        comparisons,
        rows_used,
        rows_skipped,
    })
}

fn validate_indices(row: &CoeffRow) -> Result<(), AppError> {
    if row.range_index < 0 || row.range_index >= RANGE_COUNT as i64 {
        return Err(AppError::validation(format!(
            "Line {}: range index {} out of bounds (expected 0..={}).",
            row.line,
            row.range_index,
            RANGE_COUNT - 1
        )));
    }
    if row.anchor_index < 0 || row.anchor_index >= ANCHOR_COUNT as i64 {
        return Err(AppError::validation(format!(
            "Line {}: anchor index {} out of bounds (expected 0..={}).",
            row.line,
            row.anchor_index,
            ANCHOR_COUNT - 1
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Family;

    fn row(range: i64, anchor: i64) -> CoeffRow {
        CoeffRow {
            line: 2,
            range_index: range,
            anchor_index: anchor,
            anchor: None,
            linear_a: Some(3123.45),
            linear_b: Some(0.000123456789),
            poly_p0: Some(3050.0),
            poly_p1: Some(0.01),
            poly_p2: Some(0.0000000000000001),
            old_linear_a: Some(3000.0),
            old_poly_p0: Some(3000.0),
        }
    }

    #[test]
    fn empty_input_yields_default_grids() {
        let out = build_grids(&[]).unwrap();
        for family in Family::ALL {
            let grid = out.grids.grid(family);
            for r in 0..RANGE_COUNT {
                for a in 0..ANCHOR_COUNT {
                    assert_eq!(grid.get(r, a), family.default_value());
                }
            }
        }
        assert_eq!(out.rows_used, 0);
        assert_eq!(out.rows_skipped, 0);
    }

    #[test]
    fn complete_row_writes_exactly_one_cell_per_family() {
        let out = build_grids(&[row(2, 1)]).unwrap();

        assert_eq!(out.grids.linear_a.get(2, 1), 3123.45);
        assert_eq!(out.grids.linear_b.get(2, 1), 0.000123456789);
        assert_eq!(out.grids.poly_p0.get(2, 1), 3050.0);
        assert_eq!(out.grids.poly_p1.get(2, 1), 0.01);
        assert_eq!(out.grids.poly_p2.get(2, 1), 0.0000000000000001);

        // Every other cell keeps its default.
        for r in 0..RANGE_COUNT {
            for a in 0..ANCHOR_COUNT {
                if (r, a) == (2, 1) {
                    continue;
                }
                assert_eq!(out.grids.linear_a.get(r, a), 3000.0);
                assert_eq!(out.grids.linear_b.get(r, a), 0.0);
            }
        }
        assert_eq!(out.rows_used, 1);
    }

    #[test]
    fn incomplete_row_touches_nothing() {
        let mut incomplete = row(3, 0);
        incomplete.poly_p1 = None;

        let out = build_grids(&[incomplete]).unwrap();

        for family in Family::ALL {
            assert_eq!(out.grids.grid(family).get(3, 0), family.default_value());
        }
        assert_eq!(out.rows_used, 0);
        assert_eq!(out.rows_skipped, 1);
        assert!(out.comparisons.is_empty());
    }

    #[test]
    fn incomplete_row_preserves_previously_written_cell() {
        let complete = row(1, 1);
        let mut incomplete = row(1, 1);
        incomplete.linear_a = Some(1.0);
        incomplete.poly_p1 = None;

        let out = build_grids(&[complete, incomplete]).unwrap();
        assert_eq!(out.grids.linear_a.get(1, 1), 3123.45);
        assert_eq!(out.grids.poly_p1.get(1, 1), 0.01);
        assert_eq!(out.rows_used, 1);
        assert_eq!(out.rows_skipped, 1);
    }

    #[test]
    fn duplicate_key_is_last_write_wins() {
        let first = row(1, 2);
        let mut second = row(1, 2);
        second.linear_a = Some(2999.0);

        let out = build_grids(&[first, second]).unwrap();
        assert_eq!(out.grids.linear_a.get(1, 2), 2999.0);
        assert_eq!(out.rows_used, 2);
    }

    #[test]
    fn out_of_range_range_index_fails() {
        let err = build_grids(&[row(6, 0)]).unwrap_err();
        assert_eq!(err.exit_code(), 4);
        assert!(err.to_string().contains("range index 6"));
    }

    #[test]
    fn out_of_range_anchor_index_fails() {
        let err = build_grids(&[row(0, 3)]).unwrap_err();
        assert_eq!(err.exit_code(), 4);
        assert!(err.to_string().contains("anchor index 3"));
    }

    #[test]
    fn negative_index_fails_rather_than_wrapping() {
        let err = build_grids(&[row(-1, 0)]).unwrap_err();
        assert_eq!(err.exit_code(), 4);
    }

    #[test]
    fn bad_index_on_incomplete_row_still_fails() {
        let mut incomplete = row(7, 0);
        incomplete.linear_a = None;
        let err = build_grids(&[incomplete]).unwrap_err();
        assert_eq!(err.exit_code(), 4);
    }

    #[test]
    fn comparison_uses_anchor_label_fallback() {
        let out = build_grids(&[row(0, 2)]).unwrap();
        assert_eq!(out.comparisons.len(), 1);
        assert_eq!(out.comparisons[0].anchor, "A3");
        assert_eq!(out.comparisons[0].old_linear_a, Some(3000.0));
        assert_eq!(out.comparisons[0].new_linear_a, 3123.45);
    }
}

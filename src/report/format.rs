//! Formatted output for the `emit`, `inspect`, and `extract` commands.
//!
//! The `emit` output is C source meant to be pasted into the tag firmware's
//! `regression.h`; every line that is not an array literal is a `//` comment
//! so the whole document can be pasted as-is.

use crate::domain::{
    ANCHOR_COUNT, CoeffGrid, Comparison, EmitConfig, Family, RANGE_COUNT, range_label,
};
use crate::grid::BuildOutput;
use crate::io::extract::SheetSummary;
use crate::io::ingest::{CsvPreview, IngestedData};

/// Render the complete `emit` document: banner, array blocks, comparison
/// listing, and a comment trailer with row counts.
pub fn format_emit(build: &BuildOutput, ingest: &IngestedData, config: &EmitConfig) -> String {
    let mut out = String::new();

    out.push_str(&format_banner(config));
    out.push('\n');

    for family in Family::ALL {
        if let Some(only) = config.only {
            if only != family {
                continue;
            }
        }
        out.push_str(&format_family_block(
            family,
            build.grids.grid(family),
            &config.suffix,
        ));
        out.push('\n');
    }

    if config.compare {
        out.push_str(&format_comparison(&build.comparisons));
        out.push('\n');
    }

    out.push_str(&format!(
        "// Rows: read={}, applied={}, skipped={}, parse-errors={}\n",
        ingest.rows_read,
        build.rows_used,
        build.rows_skipped,
        ingest.row_errors.len(),
    ));
    out.push_str(&match &config.label {
        Some(label) => format!("// ✓ Coefficients organized and ready for {label}\n"),
        None => "// ✓ Coefficients organized and ready\n".to_string(),
    });

    out
}

fn format_banner(config: &EmitConfig) -> String {
    let mut out = String::new();
    let title = match &config.label {
        Some(label) => format!("NEW REGRESSION COEFFICIENTS ({label})"),
        None => "NEW REGRESSION COEFFICIENTS".to_string(),
    };
    out.push_str(&format!(
        "// ==================== {title} ====================\n"
    ));
    out.push_str(&format!(
        "// Source: {}\n",
        config.csv_path.display()
    ));
    out
}

/// Render one family's table as a C array literal.
///
/// The shape is fixed by the firmware: two-space indent, one brace-wrapped row
/// per range (trailing comma included), family-specific fractional digits.
pub fn format_family_block(family: Family, grid: &CoeffGrid, suffix: &str) -> String {
    let name = array_ident(family, suffix);
    let prec = family.precision();

    let mut out = String::new();
    out.push_str(&format!(
        "const float {name}[{RANGE_COUNT}][{ANCHOR_COUNT}] = {{\n"
    ));
    for r in 0..RANGE_COUNT {
        let cells: Vec<String> = (0..ANCHOR_COUNT)
            .map(|a| format!("{:.prec$}", grid.get(r, a)))
            .collect();
        out.push_str(&format!("  {{{}}},\n", cells.join(", ")));
    }
    out.push_str("};\n");
    out
}

fn array_ident(family: Family, suffix: &str) -> String {
    if suffix.is_empty() {
        family.array_name().to_string()
    } else {
        format!("{}_{suffix}", family.array_name())
    }
}

/// Render the comment-style old-vs-new listing, one line per applied row.
pub fn format_comparison(comparisons: &[Comparison]) -> String {
    let mut out = String::new();
    out.push_str("// Comparison table (for reference):\n");
    out.push_str("// Range | Anchor | OLD vs NEW Linear A | OLD vs NEW Poly P0\n");

    for c in comparisons {
        out.push_str(&format!(
            "// {:<10} | {} | OLD:{} NEW:{:>10.2} | OLD:{} NEW:{:>10.2}\n",
            range_label(c.range_index),
            c.anchor,
            fmt_old(c.old_linear_a),
            c.new_linear_a,
            fmt_old(c.old_poly_p0),
            c.new_poly_p0,
        ));
    }

    out
}

fn fmt_old(v: Option<f64>) -> String {
    match v {
        Some(v) => format!("{v:>10.2}"),
        None => " ".repeat(10),
    }
}

/// Format the `inspect` summary: shape, columns, first rows.
pub fn format_preview(preview: &CsvPreview) -> String {
    let mut out = String::new();

    out.push_str(&format!(
        "Shape: {} rows x {} columns\n",
        preview.total_rows,
        preview.columns.len()
    ));
    out.push_str(&format!("Columns: [{}]\n", preview.columns.join(", ")));

    if preview.rows.is_empty() {
        out.push_str("(no data rows)\n");
        return out;
    }

    out.push_str(&format!("First {} rows:\n", preview.rows.len()));

    // Column widths sized to the preview content.
    let mut widths: Vec<usize> = preview.columns.iter().map(String::len).collect();
    for row in &preview.rows {
        for (i, cell) in row.iter().enumerate() {
            if i < widths.len() {
                widths[i] = widths[i].max(cell.len());
            }
        }
    }

    let header: Vec<String> = preview
        .columns
        .iter()
        .enumerate()
        .map(|(i, name)| format!("{name:>w$}", w = widths[i]))
        .collect();
    out.push_str(&format!("  {}\n", header.join("  ")));

    for row in &preview.rows {
        let cells: Vec<String> = row
            .iter()
            .enumerate()
            .map(|(i, cell)| {
                let w = widths.get(i).copied().unwrap_or(cell.len());
                format!("{cell:>w$}")
            })
            .collect();
        out.push_str(&format!("  {}\n", cells.join("  ")));
    }

    out
}

/// Format the `extract` run report, one section per written sheet.
pub fn format_extract_summary(summaries: &[SheetSummary]) -> String {
    let mut out = String::new();
    for s in summaries {
        out.push_str(&format!("=== Sheet: {} ===\n", s.name));
        out.push_str(&format!("Shape: {} rows x {} columns\n", s.rows, s.cols));
        out.push_str(&format!("Columns: [{}]\n", s.columns.join(", ")));
        out.push_str(&format!("Saved to: {}\n", s.csv_path.display()));
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::GridSet;

    #[test]
    fn default_linear_a_block_renders_sentinels() {
        let grids = GridSet::with_defaults();
        let block = format_family_block(Family::LinearA, &grids.linear_a, "NEW");

        let expected = "const float LINEAR_A_NEW[6][3] = {\n\
                        \x20 {3000.000000, 3000.000000, 3000.000000},\n\
                        \x20 {3000.000000, 3000.000000, 3000.000000},\n\
                        \x20 {3000.000000, 3000.000000, 3000.000000},\n\
                        \x20 {3000.000000, 3000.000000, 3000.000000},\n\
                        \x20 {3000.000000, 3000.000000, 3000.000000},\n\
                        \x20 {3000.000000, 3000.000000, 3000.000000},\n\
                        };\n";
        assert_eq!(block, expected);
    }

    #[test]
    fn empty_suffix_drops_the_underscore() {
        let grids = GridSet::with_defaults();
        let block = format_family_block(Family::PolyP2, &grids.poly_p2, "");
        assert!(block.starts_with("const float POLY_P2[6][3] = {"));
    }

    #[test]
    fn linear_b_renders_twelve_fractional_digits_and_round_trips() {
        let mut grids = GridSet::with_defaults();
        grids.linear_b.set(2, 1, 0.000123456789);

        let block = format_family_block(Family::LinearB, &grids.linear_b, "NEW");
        assert!(block.contains("0.000123456789"));

        // Row 2, middle cell.
        let line = block.lines().nth(3).unwrap();
        let cell = line
            .trim()
            .trim_start_matches('{')
            .trim_end_matches("},")
            .split(", ")
            .nth(1)
            .unwrap();
        assert_eq!(cell.split('.').nth(1).unwrap().len(), 12);
        assert_eq!(cell.parse::<f64>().unwrap(), 0.000123456789);
    }

    #[test]
    fn poly_p2_renders_eighteen_fractional_digits_and_round_trips() {
        let mut grids = GridSet::with_defaults();
        grids.poly_p2.set(0, 0, 0.0000000000000001);

        let block = format_family_block(Family::PolyP2, &grids.poly_p2, "NEW");
        let line = block.lines().nth(1).unwrap();
        let cell = line
            .trim()
            .trim_start_matches('{')
            .trim_end_matches("},")
            .split(", ")
            .next()
            .unwrap();
        assert_eq!(cell.split('.').nth(1).unwrap().len(), 18);
        assert_eq!(cell.parse::<f64>().unwrap(), 0.0000000000000001);
    }

    #[test]
    fn comparison_line_layout_is_fixed_width() {
        let comparisons = vec![Comparison {
            range_index: 0,
            anchor: "A1".to_string(),
            old_linear_a: Some(3000.0),
            new_linear_a: 3123.45,
            old_poly_p0: Some(3000.0),
            new_poly_p0: 3050.0,
        }];

        let text = format_comparison(&comparisons);
        let line = text.lines().nth(2).unwrap();
        assert_eq!(
            line,
            "// 10-50cm    | A1 | OLD:   3000.00 NEW:   3123.45 | OLD:   3000.00 NEW:   3050.00"
        );
    }

    #[test]
    fn missing_old_value_renders_as_blank_field() {
        let comparisons = vec![Comparison {
            range_index: 5,
            anchor: "A2".to_string(),
            old_linear_a: None,
            new_linear_a: 3000.0,
            old_poly_p0: None,
            new_poly_p0: 3000.0,
        }];

        let text = format_comparison(&comparisons);
        let line = text.lines().nth(2).unwrap();
        assert!(line.contains("OLD:           NEW:   3000.00"));
        assert!(line.starts_with("// 3k+        | A2 |"));
    }

    #[test]
    fn preview_formats_shape_and_columns() {
        let preview = CsvPreview {
            columns: vec!["range".to_string(), "anchor_idx".to_string()],
            rows: vec![vec!["0".to_string(), "1".to_string()]],
            total_rows: 4,
        };
        let text = format_preview(&preview);
        assert!(text.starts_with("Shape: 4 rows x 2 columns\n"));
        assert!(text.contains("Columns: [range, anchor_idx]"));
        assert!(text.contains("First 1 rows:"));
    }
}

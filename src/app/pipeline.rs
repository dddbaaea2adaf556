//! Shared "emit pipeline" logic.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! CSV ingest -> grid build -> render
//!
//! `app` then only decides where the rendered text goes (stdout, files).

use log::debug;

use crate::domain::EmitConfig;
use crate::error::AppError;
use crate::grid::BuildOutput;
use crate::io::ingest::IngestedData;

/// All computed outputs of a single `calib emit` run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub ingest: IngestedData,
    pub build: BuildOutput,
    pub rendered: String,
}

/// Execute the full emit pipeline and return the computed outputs.
pub fn run_emit(config: &EmitConfig) -> Result<RunOutput, AppError> {
    // 1) Ingest the comparison CSV.
    let ingest = crate::io::ingest::load_coeff_rows(&config.csv_path)?;
    debug!(
        "ingested {} rows ({} complete, {} rejected) from {}",
        ingest.rows.len(),
        ingest.rows_complete,
        ingest.row_errors.len(),
        config.csv_path.display()
    );

    // 2) Build the five coefficient grids.
    let build = crate::grid::build_grids(&ingest.rows)?;
    debug!(
        "built grids from {} rows ({} skipped)",
        build.rows_used, build.rows_skipped
    );

    // 3) Render the paste-ready document.
    let rendered = crate::report::format_emit(&build, &ingest, config);

    Ok(RunOutput {
        ingest,
        build,
        rendered,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;

    fn config(csv_path: PathBuf) -> EmitConfig {
        EmitConfig {
            csv_path,
            label: Some("v3.0.8".to_string()),
            suffix: "NEW".to_string(),
            only: None,
            compare: true,
            export: None,
            export_json: None,
        }
    }

    #[test]
    fn end_to_end_emit_produces_paste_ready_text() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            "range,anchor_idx,anchor,old_lin_a,new_lin_a,new_lin_b,old_poly_p0,new_poly_p0,new_poly_p1,new_poly_p2\n\
             2,1,A2,3000.0,3123.45,0.000123456789,3000.0,3050.0,0.01,0.0000000000000001\n\
             5,0,A1,,,,,,,\n"
        )
        .unwrap();
        file.flush().unwrap();

        let out = run_emit(&config(file.path().to_path_buf())).unwrap();

        assert_eq!(out.build.rows_used, 1);
        assert_eq!(out.build.rows_skipped, 1);

        let text = &out.rendered;
        assert!(text.contains("NEW REGRESSION COEFFICIENTS (v3.0.8)"));
        assert!(text.contains("const float LINEAR_A_NEW[6][3] = {"));
        assert!(text.contains("const float POLY_P2_NEW[6][3] = {"));
        assert!(text.contains("0.000123456789"));
        assert!(text.contains("// 100-500cm  | A2 |"));
        assert!(text.contains("// Rows: read=2, applied=1, skipped=1, parse-errors=0"));
    }

    #[test]
    fn out_of_range_row_aborts_the_pipeline() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            "range,anchor_idx,new_lin_a,new_lin_b,new_poly_p0,new_poly_p1,new_poly_p2\n\
             6,0,1.0,2.0,3.0,4.0,5.0\n"
        )
        .unwrap();
        file.flush().unwrap();

        let err = run_emit(&config(file.path().to_path_buf())).unwrap_err();
        assert_eq!(err.exit_code(), 4);
    }
}

//! Write `emit` results to files.
//!
//! Two forms:
//! - the rendered text, byte-for-byte what went to stdout (so the snippet can
//!   be checked in next to the firmware)
//! - a grid JSON file for downstream tooling

use std::fs::File;
use std::io::Write;
use std::path::Path;

use chrono::Local;

use crate::domain::{CoeffFile, EmitConfig, GridSet};
use crate::error::AppError;

/// Write the rendered emit document to a file.
pub fn write_emit_text(path: &Path, rendered: &str) -> Result<(), AppError> {
    let mut file = File::create(path).map_err(|e| {
        AppError::input(format!(
            "Failed to create export file '{}': {e}",
            path.display()
        ))
    })?;

    file.write_all(rendered.as_bytes())
        .map_err(|e| AppError::input(format!("Failed to write export file: {e}")))?;

    Ok(())
}

/// Write the built grids as JSON.
pub fn write_grids_json(path: &Path, grids: &GridSet, config: &EmitConfig) -> Result<(), AppError> {
    let file = File::create(path).map_err(|e| {
        AppError::input(format!(
            "Failed to create grid JSON '{}': {e}",
            path.display()
        ))
    })?;

    let out = CoeffFile {
        tool: "calib".to_string(),
        generated: Local::now(),
        label: config.label.clone(),
        source: config.csv_path.display().to_string(),
        grids: grids.clone(),
    };

    serde_json::to_writer_pretty(file, &out)
        .map_err(|e| AppError::input(format!("Failed to write grid JSON: {e}")))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Family;
    use std::path::PathBuf;

    fn config(csv: &str) -> EmitConfig {
        EmitConfig {
            csv_path: PathBuf::from(csv),
            label: Some("v3.0.8".to_string()),
            suffix: "NEW".to_string(),
            only: None,
            compare: true,
            export: None,
            export_json: None,
        }
    }

    #[test]
    fn grid_json_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("grids.json");

        let mut grids = GridSet::with_defaults();
        grids.linear_a.set(2, 1, 3123.45);

        write_grids_json(&path, &grids, &config("compare_data.csv")).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let parsed: CoeffFile = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed.tool, "calib");
        assert_eq!(parsed.label.as_deref(), Some("v3.0.8"));
        assert_eq!(parsed.source, "compare_data.csv");
        assert_eq!(parsed.grids.linear_a.get(2, 1), 3123.45);
        assert_eq!(
            parsed.grids.poly_p0.get(0, 0),
            Family::PolyP0.default_value()
        );
    }

    #[test]
    fn emit_text_is_written_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("regression_new.h");

        write_emit_text(&path, "const float X[1][1] = {\n  {0.0},\n};\n").unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, "const float X[1][1] = {\n  {0.0},\n};\n");
    }
}

//! Workbook-to-CSV extraction (`calib extract`).
//!
//! Pulls every sheet of a calibration workbook out to a per-sheet CSV so the
//! rest of the pipeline (and plain spreadsheet tools) can work from flat
//! files. Cell values go through their display form; the comparison-CSV
//! ingest re-parses numbers on the way back in.

use std::path::{Path, PathBuf};

use calamine::{Data, Range, Reader, Xlsx, open_workbook};

use crate::error::AppError;

/// What got written for one sheet.
#[derive(Debug, Clone)]
pub struct SheetSummary {
    pub name: String,
    /// Data rows (header excluded).
    pub rows: usize,
    pub cols: usize,
    pub columns: Vec<String>,
    pub csv_path: PathBuf,
}

/// Extract sheets of `workbook_path` to `<sheet>_data.csv` files in `out_dir`.
///
/// `only_sheet` limits extraction to a single named sheet.
pub fn extract_workbook(
    workbook_path: &Path,
    out_dir: &Path,
    only_sheet: Option<&str>,
) -> Result<Vec<SheetSummary>, AppError> {
    let mut workbook: Xlsx<_> = open_workbook(workbook_path).map_err(|e| {
        AppError::input(format!(
            "Failed to open workbook '{}': {e}",
            workbook_path.display()
        ))
    })?;

    let sheet_names = workbook.sheet_names().to_owned();

    let selected: Vec<String> = match only_sheet {
        Some(name) => {
            if !sheet_names.iter().any(|s| s == name) {
                return Err(AppError::input(format!(
                    "Sheet '{name}' not found in '{}'. Available sheets: [{}].",
                    workbook_path.display(),
                    sheet_names.join(", ")
                )));
            }
            vec![name.to_string()]
        }
        None => sheet_names,
    };

    std::fs::create_dir_all(out_dir).map_err(|e| {
        AppError::input(format!(
            "Failed to create output directory '{}': {e}",
            out_dir.display()
        ))
    })?;

    let mut summaries = Vec::with_capacity(selected.len());
    for name in &selected {
        let range = workbook.worksheet_range(name).map_err(|e| {
            AppError::input(format!("Failed to read sheet '{name}': {e}"))
        })?;

        let csv_path = out_dir.join(csv_file_name(name));
        write_sheet_csv(&csv_path, &range)?;

        let (total_rows, cols) = range.get_size();
        let columns = range
            .rows()
            .next()
            .map(|header| header.iter().map(Data::to_string).collect())
            .unwrap_or_default();

        summaries.push(SheetSummary {
            name: name.clone(),
            rows: total_rows.saturating_sub(1),
            cols,
            columns,
            csv_path,
        });
    }

    Ok(summaries)
}

fn csv_file_name(sheet: &str) -> String {
    format!("{}_data.csv", sheet.replace(' ', "_"))
}

fn write_sheet_csv(path: &Path, range: &Range<Data>) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_path(path).map_err(|e| {
        AppError::input(format!("Failed to create CSV '{}': {e}", path.display()))
    })?;

    for row in range.rows() {
        let record: Vec<String> = row.iter().map(Data::to_string).collect();
        writer
            .write_record(&record)
            .map_err(|e| AppError::input(format!("Failed to write CSV row: {e}")))?;
    }

    writer
        .flush()
        .map_err(|e| AppError::input(format!("Failed to flush CSV '{}': {e}", path.display())))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn sheet_names_with_spaces_become_underscored_files() {
        assert_eq!(csv_file_name("Sheet 1"), "Sheet_1_data.csv");
        assert_eq!(csv_file_name("compare"), "compare_data.csv");
    }

    #[test]
    fn non_workbook_input_is_an_input_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"not a workbook").unwrap();
        file.flush().unwrap();

        let dir = tempfile::tempdir().unwrap();
        let err = extract_workbook(file.path(), dir.path(), None).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}

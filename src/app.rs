//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - runs the emit pipeline
//! - prints summaries/array literals
//! - writes optional exports

use clap::Parser;

use crate::cli::{Command, EmitArgs, ExtractArgs, InspectArgs};
use crate::domain::EmitConfig;
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `calib` binary.
pub fn run() -> Result<(), AppError> {
    // We want `calib compare_data.csv` to behave like `calib emit compare_data.csv`.
    //
    // Clap requires a subcommand name, so we do a small, explicit rewrite of the
    // argv list before parsing. This preserves a clean clap structure while
    // keeping the common one-argument invocation short.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Emit(args) => handle_emit(args),
        Command::Inspect(args) => handle_inspect(args),
        Command::Extract(args) => handle_extract(args),
    }
}

fn handle_emit(args: EmitArgs) -> Result<(), AppError> {
    let config = emit_config_from_args(&args);
    let run = pipeline::run_emit(&config)?;

    for err in &run.ingest.row_errors {
        log::warn!("line {}: {}", err.line, err.message);
    }

    print!("{}", run.rendered);

    // Optional exports.
    if let Some(path) = &config.export {
        crate::io::export::write_emit_text(path, &run.rendered)?;
    }
    if let Some(path) = &config.export_json {
        crate::io::export::write_grids_json(path, &run.build.grids, &config)?;
    }

    Ok(())
}

fn handle_inspect(args: InspectArgs) -> Result<(), AppError> {
    let preview = crate::io::ingest::load_preview(&args.csv, args.rows)?;
    print!("{}", crate::report::format_preview(&preview));
    Ok(())
}

fn handle_extract(args: ExtractArgs) -> Result<(), AppError> {
    let summaries =
        crate::io::extract::extract_workbook(&args.workbook, &args.out_dir, args.sheet.as_deref())?;
    print!("{}", crate::report::format_extract_summary(&summaries));
    Ok(())
}

pub fn emit_config_from_args(args: &EmitArgs) -> EmitConfig {
    EmitConfig {
        csv_path: args.csv.clone(),
        label: args.label.clone(),
        suffix: args.suffix.clone(),
        only: args.only,
        compare: !args.no_compare,
        export: args.export.clone(),
        export_json: args.export_json.clone(),
    }
}

/// Rewrite argv so a bare CSV argument defaults to the `emit` subcommand.
///
/// Rules:
/// - `calib data.csv ...`       -> `calib emit data.csv ...`
/// - `calib emit/inspect/...`   -> unchanged
/// - `calib --help/--version`   -> unchanged (show top-level help/version)
/// - `calib -x ...`             -> unchanged (let clap report the bad flag)
fn rewrite_args(argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        return argv;
    };

    if arg1.starts_with('-') || matches!(arg1.as_str(), "help" | "emit" | "inspect" | "extract") {
        return argv;
    }

    let mut argv = argv;
    argv.insert(1, "emit".to_string());
    argv
}

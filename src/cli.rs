use std::env;
use std::path::{Path, PathBuf};

use crate::analysis::items::ItemClassifier;
use crate::analysis::{analyze, AnalysisReport};
use crate::config::{self, AnalysisConfig};
use crate::data::extract::{extract_workbook, DEFAULT_OUTPUT_DIR};
use crate::data::ingest::{load_analysis_input, DEFAULT_DATA_DIR};
use crate::data::loot_tables::{load_slot_overrides, DEFAULT_LOOT_TABLES_PATH};
use crate::export::{default_report_path, write_report};
use crate::server;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Serve,
    Analyze,
    Export,
    Extract,
    Validate,
}

pub fn parse_command(args: &[String]) -> Option<Command> {
    match args.get(1).map(String::as_str) {
        Some("serve") => Some(Command::Serve),
        Some("analyze") => Some(Command::Analyze),
        Some("export") => Some(Command::Export),
        Some("extract") => Some(Command::Extract),
        Some("validate") => Some(Command::Validate),
        _ => None,
    }
}

pub fn run_with_args(args: &[String]) -> i32 {
    match parse_command(args) {
        Some(Command::Serve) => handle_serve(),
        Some(Command::Analyze) => handle_analyze(args),
        Some(Command::Export) => handle_export(args),
        Some(Command::Extract) => handle_extract(args),
        Some(Command::Validate) => handle_validate(args),
        None => {
            eprintln!("usage: masterlooter <serve|analyze|export|extract|validate>");
            2
        }
    }
}

fn handle_serve() -> i32 {
    let bind_addr =
        env::var("MASTERLOOTER_BIND").unwrap_or_else(|_| "127.0.0.1:8000".to_string());
    match server::run_server(&bind_addr) {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("server error: {err}");
            1
        }
    }
}

fn data_dir_arg(args: &[String]) -> PathBuf {
    args.get(2)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR))
}

fn run_analysis(data_dir: &Path) -> Result<AnalysisReport, i32> {
    let input = match load_analysis_input(data_dir) {
        Ok(input) => input,
        Err(err) => {
            eprintln!("failed to load raid data: {err}");
            return Err(1);
        }
    };
    let config = match AnalysisConfig::load(config::DEFAULT_CONFIG_PATH) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("failed to load config: {err}");
            return Err(1);
        }
    };
    let classifier =
        ItemClassifier::with_overrides(load_slot_overrides(Path::new(DEFAULT_LOOT_TABLES_PATH)));
    match analyze(&input, &config, &classifier) {
        Ok(report) => Ok(report),
        Err(err) => {
            eprintln!("analysis failed: {err}");
            Err(1)
        }
    }
}

fn handle_analyze(args: &[String]) -> i32 {
    let report = match run_analysis(&data_dir_arg(args)) {
        Ok(report) => report,
        Err(code) => return code,
    };

    if report.total_items == 0 {
        println!("no loot data found; nothing to rank");
        return 0;
    }

    match serde_json::to_string_pretty(&report) {
        Ok(payload) => {
            println!("{payload}");
            0
        }
        Err(err) => {
            eprintln!("failed to serialize analysis report: {err}");
            1
        }
    }
}

fn handle_export(args: &[String]) -> i32 {
    let report = match run_analysis(&data_dir_arg(args)) {
        Ok(report) => report,
        Err(code) => return code,
    };

    let output = args
        .get(3)
        .cloned()
        .unwrap_or_else(default_report_path);
    match write_report(Path::new(&output), &report.recommendations) {
        Ok(()) => {
            println!(
                "report written: {} ({} players, {} items)",
                output,
                report.recommendations.len(),
                report.total_items
            );
            0
        }
        Err(err) => {
            eprintln!("export failed: {err}");
            1
        }
    }
}

fn handle_extract(args: &[String]) -> i32 {
    let Some(workbook) = args.get(2) else {
        eprintln!("usage: masterlooter extract <workbook.xlsx> [output_dir]");
        return 2;
    };
    let output_dir = args
        .get(3)
        .map(String::as_str)
        .unwrap_or(DEFAULT_OUTPUT_DIR);

    match extract_workbook(Path::new(workbook), Path::new(output_dir)) {
        Ok(report) => {
            println!(
                "extracted {} sheet(s) into {}; {} consolidated players",
                report.sheets_processed, output_dir, report.consolidated_players
            );
            for skipped in &report.sheets_skipped {
                println!("skipped sheet without participant table: {skipped}");
            }
            0
        }
        Err(err) => {
            eprintln!("extract failed: {err}");
            1
        }
    }
}

fn handle_validate(args: &[String]) -> i32 {
    let path = args
        .get(2)
        .map(String::as_str)
        .unwrap_or(config::DEFAULT_CONFIG_PATH);

    let config = match AnalysisConfig::load(path) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("validation failed: {err}");
            return 1;
        }
    };
    match config.validate() {
        Ok(()) => {
            println!("validation passed: {path}");
            0
        }
        Err(issues) => {
            eprintln!("validation failed: {} issue(s)", issues.len());
            for issue in issues {
                eprintln!("- {issue}");
            }
            1
        }
    }
}

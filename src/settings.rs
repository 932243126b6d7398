use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::pipeline::IngestConfig;

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Clean heterogeneous building meter exports and summarize campus energy use
#[derive(Parser, Debug, Clone)]
#[command(name = "campus-energy", version)]
pub struct Settings {
    /// Logging level
    #[arg(long, global = true, default_value = "info", env = "CAMPUS_ENERGY_LOG",
          value_parser = ["trace", "debug", "info", "warn", "error"])]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Ingest a folder of meter exports into one cleaned dataset
    Run(RunArgs),

    /// Summarize an existing cleaned dataset
    Report(ReportArgs),
}

#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Folder holding the raw exports
    #[arg(long, default_value = "data", env = "CAMPUS_ENERGY_DATA")]
    pub input_dir: PathBuf,

    /// Where the cleaned dataset is written
    #[arg(long, short, default_value = "cleaned_energy_data.csv")]
    pub output: PathBuf,

    /// Outcome log, truncated at the start of each run
    #[arg(long, default_value = "ingestion_log.txt")]
    pub log_file: PathBuf,

    /// File extension of the raw exports
    #[arg(long, default_value = "csv")]
    pub extension: String,

    /// Also write summary reports into this folder
    #[arg(long)]
    pub report_dir: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct ReportArgs {
    /// Cleaned dataset produced by `run`
    #[arg(long, default_value = "cleaned_energy_data.csv")]
    pub dataset: PathBuf,

    /// Folder for building_summary.csv, campus_stats.json and summary.txt
    #[arg(long, default_value = ".")]
    pub report_dir: PathBuf,
}

impl RunArgs {
    pub fn ingest_config(&self) -> IngestConfig {
        IngestConfig {
            input_dir: self.input_dir.clone(),
            extension: self.extension.trim_start_matches('.').to_string(),
            output_path: self.output.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_args(settings: &Settings) -> &RunArgs {
        match &settings.command {
            Command::Run(args) => args,
            other => panic!("expected run, got {:?}", other),
        }
    }

    #[test]
    fn test_run_defaults() {
        let settings = Settings::try_parse_from(["campus-energy", "run"]).unwrap();
        let args = run_args(&settings);
        let config = args.ingest_config();
        assert_eq!(config.output_path, PathBuf::from("cleaned_energy_data.csv"));
        assert_eq!(config.extension, "csv");
        assert_eq!(args.log_file, PathBuf::from("ingestion_log.txt"));
        assert!(args.report_dir.is_none());
        assert_eq!(settings.log_level, "info");
    }

    #[test]
    fn test_run_with_explicit_paths() {
        let settings = Settings::try_parse_from([
            "campus-energy",
            "run",
            "--input-dir",
            "/srv/meters",
            "-o",
            "out/clean.csv",
            "--extension",
            ".CSV",
            "--report-dir",
            "reports",
            "--log-level",
            "debug",
        ])
        .unwrap();
        let args = run_args(&settings);
        let config = args.ingest_config();
        assert_eq!(config.input_dir, PathBuf::from("/srv/meters"));
        assert_eq!(config.output_path, PathBuf::from("out/clean.csv"));
        assert_eq!(config.extension, "CSV");
        assert_eq!(args.report_dir, Some(PathBuf::from("reports")));
        assert_eq!(settings.log_level, "debug");
    }

    #[test]
    fn test_report_arguments() {
        let settings =
            Settings::try_parse_from(["campus-energy", "report", "--dataset", "x.csv"]).unwrap();
        match settings.command {
            Command::Report(args) => {
                assert_eq!(args.dataset, PathBuf::from("x.csv"));
                assert_eq!(args.report_dir, PathBuf::from("."));
            }
            other => panic!("expected report, got {:?}", other),
        }
    }

    #[test]
    fn test_rejects_unknown_log_level() {
        assert!(Settings::try_parse_from(["campus-energy", "--log-level", "loud", "run"]).is_err());
    }
}

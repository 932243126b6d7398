// Entry point and high-level CLI flow.
//
// - `run` ingests a folder of meter exports into the cleaned dataset and,
//   when asked, writes the summary reports next to it.
// - `report` reloads an existing cleaned dataset and writes the reports.
//
// Exit status is non-zero whenever no file could be ingested.
use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, Result};
use campus_energy::aggregation::{
    average_weekly_by_building, building_summaries, campus_stats, peak_hours_by_building,
};
use campus_energy::ingest_log::IngestionLog;
use campus_energy::loader::load_canonical;
use campus_energy::output::{preview_table, write_csv, write_json, write_text};
use campus_energy::pipeline::run_ingestion;
use campus_energy::report::render_summary;
use campus_energy::settings::{Command, ReportArgs, RunArgs, Settings};
use campus_energy::types::CanonicalRecord;
use campus_energy::util::format_int;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn setup_logging(log_level: &str) {
    let filter = EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .init();
}

/// Write building_summary.csv, campus_stats.json and summary.txt, and print
/// short previews of each.
fn write_reports(records: &[CanonicalRecord], report_dir: &Path) -> Result<()> {
    let buildings = building_summaries(records);
    let stats = campus_stats(records);
    let summary = render_summary(&stats, &buildings);

    let summary_csv = report_dir.join("building_summary.csv");
    write_csv(&summary_csv, &buildings)
        .with_context(|| format!("writing {}", summary_csv.display()))?;
    let stats_json = report_dir.join("campus_stats.json");
    write_json(&stats_json, &stats).with_context(|| format!("writing {}", stats_json.display()))?;
    let summary_txt = report_dir.join("summary.txt");
    write_text(&summary_txt, &summary)
        .with_context(|| format!("writing {}", summary_txt.display()))?;

    println!("Building summary (top 5 by total kWh):\n");
    println!("{}\n", preview_table(&buildings, 5));
    println!("Average weekly usage by building:\n");
    println!("{}\n", preview_table(&average_weekly_by_building(records), 5));
    println!("Busiest hours per building:\n");
    println!("{}\n", preview_table(&peak_hours_by_building(records, 3), 15));
    println!("{}\n", summary);
    println!("(Full tables exported to {})", report_dir.display());
    Ok(())
}

fn ingest(args: &RunArgs) -> Result<ExitCode> {
    let mut log = IngestionLog::create(&args.log_file)
        .with_context(|| format!("opening ingestion log {}", args.log_file.display()))?;
    let result = run_ingestion(&args.ingest_config(), &mut log);
    log.finish()
        .with_context(|| format!("flushing ingestion log {}", args.log_file.display()))?;

    // Failures are already in the outcome log and on stderr.
    let Ok(ingestion) = result else {
        return Ok(ExitCode::FAILURE);
    };
    println!(
        "Ingested {} rows from {} files ({} skipped) into {}",
        format_int(ingestion.records.len()),
        format_int(ingestion.files_loaded()),
        format_int(ingestion.files_skipped()),
        ingestion.output_path.display()
    );
    if let Some(dir) = &args.report_dir {
        write_reports(&ingestion.records, dir)?;
    }
    Ok(ExitCode::SUCCESS)
}

fn report(args: &ReportArgs) -> Result<ExitCode> {
    let (records, load_report) = load_canonical(&args.dataset).with_context(|| {
        format!("{} not found or unreadable. Run ingestion first.", args.dataset.display())
    })?;
    println!(
        "Processing dataset... ({} rows read, {} usable)",
        format_int(load_report.total_rows),
        format_int(load_report.loaded_rows)
    );
    write_reports(&records, &args.report_dir)?;
    Ok(ExitCode::SUCCESS)
}

fn main() -> ExitCode {
    let settings = Settings::parse();
    setup_logging(&settings.log_level);
    tracing::debug!("campus-energy v{} starting", env!("CARGO_PKG_VERSION"));

    let outcome = match &settings.command {
        Command::Run(args) => ingest(args),
        Command::Report(args) => report(args),
    };
    match outcome {
        Ok(code) => code,
        Err(err) => {
            tracing::error!("{:#}", err);
            ExitCode::FAILURE
        }
    }
}

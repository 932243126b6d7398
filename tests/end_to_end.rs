use std::path::Path;

use campus_energy::aggregation::{building_summaries, campus_stats};
use campus_energy::error::PipelineError;
use campus_energy::ingest_log::IngestionLog;
use campus_energy::loader::load_canonical;
use campus_energy::pipeline::{run_ingestion, IngestConfig};
use tempfile::TempDir;

fn write(dir: &Path, name: &str, body: &str) {
    std::fs::create_dir_all(dir).unwrap();
    std::fs::write(dir.join(name), body).unwrap();
}

fn config_for(tmp: &TempDir) -> IngestConfig {
    IngestConfig {
        input_dir: tmp.path().join("data"),
        extension: "csv".to_string(),
        output_path: tmp.path().join("cleaned_energy_data.csv"),
    }
}

#[test]
fn test_two_buildings_in_january() {
    let tmp = TempDir::new().unwrap();
    let config = config_for(&tmp);
    write(
        &config.input_dir,
        "A_jan.csv",
        "timestamp,kwh\n2024-01-01 00:00,10\n2024-01-02 00:00,20\n",
    );
    write(&config.input_dir, "B_jan.csv", "timestamp,kwh\n2024-01-01 00:00,5\n");

    let mut log = IngestionLog::new(Vec::new());
    let ingestion = run_ingestion(&config, &mut log).unwrap();
    assert_eq!(ingestion.records.len(), 3);

    let summaries = building_summaries(&ingestion.records);
    assert_eq!(summaries.len(), 2);
    let a = &summaries[0];
    assert_eq!(
        (a.building.as_str(), a.count, a.total_kwh, a.mean_kwh, a.min_kwh, a.max_kwh),
        ("A", 2, 30.0, 15.0, 10.0, 20.0)
    );
    let b = &summaries[1];
    assert_eq!(
        (b.building.as_str(), b.count, b.total_kwh, b.mean_kwh, b.min_kwh, b.max_kwh),
        ("B", 1, 5.0, 5.0, 5.0, 5.0)
    );

    let stats = campus_stats(&ingestion.records);
    assert_eq!(stats.total_campus_kwh, 35.0);
    assert_eq!(stats.highest_building.as_deref(), Some("A"));
    assert_eq!(
        stats.daily_totals_series,
        vec![("2024-01-01".to_string(), 15.0), ("2024-01-02".to_string(), 20.0)]
    );

    // The persisted dataset reloads to the same statistics.
    let (reloaded, report) = load_canonical(&config.output_path).unwrap();
    assert_eq!(report.loaded_rows, 3);
    assert_eq!(campus_stats(&reloaded), stats);
}

#[test]
fn test_file_without_numbers_is_skipped_but_run_succeeds() {
    let tmp = TempDir::new().unwrap();
    let config = config_for(&tmp);
    write(&config.input_dir, "Lab_jan.csv", "Date,Energy\n2024-01-05,3.5\n");
    write(&config.input_dir, "Shed_jan.csv", "when,status\n2024-01-05,offline\n");

    let mut log = IngestionLog::new(Vec::new());
    let ingestion = run_ingestion(&config, &mut log).unwrap();
    assert_eq!(ingestion.records.len(), 1);
    assert_eq!(ingestion.records[0].building, "Lab");

    let text = String::from_utf8(log.finish().unwrap()).unwrap();
    assert!(text.contains("no usable kwh column"));
    assert!(text.contains("SKIPPED: Shed_jan.csv"));
    assert!(text.contains("Ingestion completed successfully."));
}

#[test]
fn test_empty_directory_produces_no_dataset() {
    let tmp = TempDir::new().unwrap();
    let config = config_for(&tmp);
    std::fs::create_dir_all(&config.input_dir).unwrap();

    let mut log = IngestionLog::new(Vec::new());
    let err = run_ingestion(&config, &mut log).unwrap_err();
    assert!(matches!(err, PipelineError::NoInputFiles { .. }));
    assert!(!config.output_path.exists());
}

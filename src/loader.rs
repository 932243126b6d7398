use crate::types::{CanonicalRecord, RawCanonicalRow, UNKNOWN_BUILDING};
use crate::util::{parse_f64_safe, parse_timestamp};
use csv::ReaderBuilder;
use std::path::Path;
use tracing::debug;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadReport {
    pub total_rows: usize,
    pub loaded_rows: usize,
    pub parse_errors: usize,
    pub dropped_timestamps: usize,
    pub coerced_kwh: usize,
}

/// Reload a cleaned dataset written by the ingestion pipeline.
///
/// The file is treated as untrusted: bad timestamps are dropped, bad kWh
/// values become zero, a missing building column becomes `"Unknown"`.
/// Rows come back sorted by timestamp.
pub fn load_canonical(path: &Path) -> Result<(Vec<CanonicalRecord>, LoadReport), csv::Error> {
    let mut rdr = ReaderBuilder::new().flexible(true).trim(csv::Trim::All).from_path(path)?;
    let mut report = LoadReport::default();
    let mut records: Vec<CanonicalRecord> = Vec::new();

    for result in rdr.deserialize::<RawCanonicalRow>() {
        report.total_rows += 1;
        let row = match result {
            Ok(r) => r,
            Err(_) => {
                report.parse_errors += 1;
                continue;
            }
        };

        let Some(timestamp) = parse_timestamp(row.timestamp.as_deref()) else {
            report.dropped_timestamps += 1;
            continue;
        };
        let kwh = match parse_f64_safe(row.kwh.as_deref()) {
            Some(v) => v,
            None => {
                report.coerced_kwh += 1;
                0.0
            }
        };
        let building = row
            .building
            .map(|b| b.trim().to_string())
            .filter(|b| !b.is_empty())
            .unwrap_or_else(|| UNKNOWN_BUILDING.to_string());

        records.push(CanonicalRecord { timestamp, kwh, building });
    }

    // Stable, so equal instants keep file order.
    records.sort_by_key(|r| r.timestamp);
    report.loaded_rows = records.len();
    debug!("Loaded {} of {} rows from {}", report.loaded_rows, report.total_rows, path.display());
    Ok((records, report))
}

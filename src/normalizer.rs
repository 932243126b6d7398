//! Turns one raw meter export into canonical records.
//!
//! Column discovery walks an ordered list of rules per role; the first rule
//! that picks a column wins. Anything past the first rule is a fallback and
//! is reported as a warning.

use std::path::Path;

use csv::{ReaderBuilder, StringRecord};
use tracing::debug;

use crate::error::NormalizeError;
use crate::types::{CanonicalRecord, UNKNOWN_BUILDING};
use crate::util::{parse_f64_safe, parse_timestamp};

/// One way of picking a column out of a header row.
#[derive(Debug, Clone, Copy)]
enum ColumnRule {
    /// First column whose lowercased name contains any of the needles.
    NameContains(&'static [&'static str]),
    /// The file's first column.
    FirstColumn,
    /// First column whose non-empty cells are all numbers.
    FirstNumeric,
}

const TIMESTAMP_RULES: &[ColumnRule] = &[
    ColumnRule::NameContains(&["time", "date"]),
    ColumnRule::FirstColumn,
];

const ENERGY_RULES: &[ColumnRule] = &[
    ColumnRule::NameContains(&["kwh", "energy", "consumption"]),
    ColumnRule::FirstNumeric,
];

impl ColumnRule {
    fn pick(self, headers: &[String], rows: &[StringRecord]) -> Option<usize> {
        match self {
            ColumnRule::NameContains(needles) => headers
                .iter()
                .position(|h| needles.iter().any(|n| h.contains(n))),
            ColumnRule::FirstColumn => (!headers.is_empty()).then_some(0),
            ColumnRule::FirstNumeric => (0..headers.len()).find(|&i| is_numeric_column(rows, i)),
        }
    }
}

fn is_numeric_column(rows: &[StringRecord], idx: usize) -> bool {
    let mut seen = false;
    for row in rows {
        let cell = row.get(idx).unwrap_or("").trim();
        if cell.is_empty() {
            continue;
        }
        if cell.parse::<f64>().is_err() {
            return false;
        }
        seen = true;
    }
    seen
}

/// Apply `rules` in order. Returns the column and whether a fallback was used.
fn discover(rules: &[ColumnRule], headers: &[String], rows: &[StringRecord]) -> Option<(usize, bool)> {
    rules
        .iter()
        .enumerate()
        .find_map(|(rank, rule)| rule.pick(headers, rows).map(|idx| (idx, rank > 0)))
}

/// Result of normalizing one file.
#[derive(Debug, Clone)]
pub struct NormalizedFile {
    pub building: String,
    pub timestamp_column: String,
    pub energy_column: String,
    pub records: Vec<CanonicalRecord>,
    /// Well-formed raw rows seen.
    pub rows_read: usize,
    /// Rows skipped by the CSV reader (wrong field count, bad encoding).
    pub malformed_rows: usize,
    /// Rows dropped for an unparseable timestamp.
    pub dropped_rows: usize,
    /// Rows kept with kWh substituted by zero.
    pub coerced_values: usize,
    pub warnings: Vec<String>,
}

/// Building identifier: file stem up to the first underscore.
pub fn building_from_path(path: &Path) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let prefix = stem.split('_').next().unwrap_or("").trim();
    if prefix.is_empty() {
        UNKNOWN_BUILDING.to_string()
    } else {
        prefix.to_string()
    }
}

pub fn normalize_file(path: &Path) -> Result<NormalizedFile, NormalizeError> {
    let unreadable = |source| NormalizeError::Unreadable {
        path: path.to_path_buf(),
        source,
    };
    let mut rdr = ReaderBuilder::new()
        .flexible(false)
        .from_path(path)
        .map_err(unreadable)?;

    let headers: Vec<String> = rdr
        .headers()
        .map_err(unreadable)?
        .iter()
        .map(|h| h.trim().to_lowercase())
        .collect();
    if headers.is_empty() || headers.iter().all(|h| h.is_empty()) {
        return Err(NormalizeError::NoColumns(path.to_path_buf()));
    }

    let mut rows: Vec<StringRecord> = Vec::new();
    let mut malformed_rows = 0usize;
    for result in rdr.records() {
        match result {
            Ok(r) => rows.push(r),
            Err(e) if matches!(e.kind(), csv::ErrorKind::Io(_)) => return Err(unreadable(e)),
            Err(e) => {
                debug!("Skipping malformed row in {}: {}", path.display(), e);
                malformed_rows += 1;
            }
        }
    }

    let mut warnings = Vec::new();
    let (ts_idx, ts_fallback) = discover(TIMESTAMP_RULES, &headers, &rows)
        .ok_or_else(|| NormalizeError::NoColumns(path.to_path_buf()))?;
    if ts_fallback {
        warnings.push(format!(
            "No timestamp column in {}. Using first column '{}'.",
            path.display(),
            headers[ts_idx]
        ));
    }
    let (kwh_idx, kwh_fallback) = discover(ENERGY_RULES, &headers, &rows)
        .ok_or_else(|| NormalizeError::NoEnergyColumn(path.to_path_buf()))?;
    if kwh_fallback {
        warnings.push(format!(
            "No kwh column in {}. Using numeric column '{}'.",
            path.display(),
            headers[kwh_idx]
        ));
    }

    let building = building_from_path(path);
    let rows_read = rows.len();
    let mut dropped_rows = 0usize;
    let mut coerced_values = 0usize;
    let mut records = Vec::with_capacity(rows_read);
    for row in &rows {
        let Some(timestamp) = parse_timestamp(row.get(ts_idx)) else {
            dropped_rows += 1;
            continue;
        };
        let kwh = match parse_f64_safe(row.get(kwh_idx)) {
            Some(v) => v,
            None => {
                coerced_values += 1;
                0.0
            }
        };
        records.push(CanonicalRecord {
            timestamp,
            kwh,
            building: building.clone(),
        });
    }

    debug!(
        "{}: {} rows read, {} malformed, {} dropped, {} coerced",
        path.display(),
        rows_read,
        malformed_rows,
        dropped_rows,
        coerced_values
    );

    Ok(NormalizedFile {
        building,
        timestamp_column: headers[ts_idx].clone(),
        energy_column: headers[kwh_idx].clone(),
        records,
        rows_read,
        malformed_rows,
        dropped_rows,
        coerced_values,
        warnings,
    })
}

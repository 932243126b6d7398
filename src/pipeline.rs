//! Directory-level ingestion: discover exports, normalize each one in
//! isolation, concatenate the survivors and persist the cleaned dataset.

use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::PipelineError;
use crate::ingest_log::{IngestionLog, Level};
use crate::normalizer::normalize_file;
use crate::output::write_csv;
use crate::types::{CanonicalRecord, FileOutcome, FileStatus};
use crate::util::format_int;

#[derive(Debug, Clone)]
pub struct IngestConfig {
    pub input_dir: PathBuf,
    /// Extension without the dot, matched case-insensitively.
    pub extension: String,
    pub output_path: PathBuf,
}

/// Output of a successful run.
#[derive(Debug, Clone)]
pub struct Ingestion {
    pub records: Vec<CanonicalRecord>,
    pub outcomes: Vec<FileOutcome>,
    pub output_path: PathBuf,
}

impl Ingestion {
    pub fn files_loaded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_loaded()).count()
    }

    pub fn files_skipped(&self) -> usize {
        self.outcomes.len() - self.files_loaded()
    }
}

/// Non-recursive listing of regular files with `extension`, ordered by name.
pub fn discover_files(dir: &Path, extension: &str) -> Result<Vec<PathBuf>, PipelineError> {
    let entries = std::fs::read_dir(dir).map_err(|source| PipelineError::ListDir {
        dir: dir.to_path_buf(),
        source,
    })?;
    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_file()
                && path
                    .extension()
                    .map(|ext| ext.to_string_lossy().eq_ignore_ascii_case(extension))
                    .unwrap_or(false)
        })
        .collect();
    files.sort();
    Ok(files)
}

/// Run one ingestion pass, writing progress to `log`.
///
/// On any pipeline-level failure nothing is written to `output_path`; the
/// failure is logged and returned.
pub fn run_ingestion<W: Write>(
    config: &IngestConfig,
    log: &mut IngestionLog<W>,
) -> Result<Ingestion, PipelineError> {
    match ingest(config, log) {
        Ok(ingestion) => {
            log.info("Ingestion completed successfully.")?;
            Ok(ingestion)
        }
        Err(err) => {
            // Keep the pipeline error even if the log itself is broken.
            let logged = log
                .error(&err.to_string())
                .and_then(|_| log.info("Ingestion failed."));
            if let Err(log_err) = logged {
                warn!("Could not record ingestion failure in log: {}", log_err);
            }
            Err(err)
        }
    }
}

fn ingest<W: Write>(
    config: &IngestConfig,
    log: &mut IngestionLog<W>,
) -> Result<Ingestion, PipelineError> {
    let dir = &config.input_dir;
    if !dir.is_dir() {
        return Err(PipelineError::InputDirMissing(dir.clone()));
    }
    let files = discover_files(dir, &config.extension)?;
    if files.is_empty() {
        return Err(PipelineError::NoInputFiles {
            dir: dir.clone(),
            extension: config.extension.clone(),
        });
    }
    debug!("Discovered {} input files in {}", files.len(), dir.display());

    let mut records: Vec<CanonicalRecord> = Vec::new();
    let mut outcomes: Vec<FileOutcome> = Vec::with_capacity(files.len());
    for path in &files {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        log.info(&format!("Reading {}....", name))?;

        let status = match normalize_file(path) {
            Ok(normalized) => {
                for warning in &normalized.warnings {
                    log.warning(warning)?;
                }
                let rows = normalized.records.len();
                let dropped = normalized.dropped_rows + normalized.malformed_rows;
                log.info(&format!(
                    "SUCCESS: Loaded {} rows from {} (building '{}', {} rows dropped)",
                    format_int(rows),
                    name,
                    normalized.building,
                    format_int(dropped)
                ))?;
                records.extend(normalized.records);
                FileStatus::Loaded { rows, dropped }
            }
            Err(err) => {
                let reason = err.to_string();
                log.record(Level::Error, &format!("SKIPPED: {} ({})", name, reason))?;
                FileStatus::Skipped { reason }
            }
        };
        outcomes.push(FileOutcome { file: name, status });
    }

    if !outcomes.iter().any(FileOutcome::is_loaded) {
        return Err(PipelineError::NoValidData {
            dir: dir.clone(),
            attempted: files.len(),
        });
    }

    write_csv(&config.output_path, &records).map_err(|source| PipelineError::Output {
        path: config.output_path.clone(),
        source,
    })?;
    log.info(&format!(
        "SAVED: Cleaned data ({} rows) -> {}",
        format_int(records.len()),
        config.output_path.display()
    ))?;

    Ok(Ingestion {
        records,
        outcomes,
        output_path: config.output_path.clone(),
    })
}

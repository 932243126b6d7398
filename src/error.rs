use std::path::PathBuf;
use thiserror::Error;

/// Definitive rejection of a single input file.
///
/// None of these abort a pipeline run; the file is skipped and the reason
/// is recorded in the outcome log.
#[derive(Error, Debug)]
pub enum NormalizeError {
    /// The file could not be opened or its header could not be parsed.
    #[error("could not read {path}: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// The file has no header row at all.
    #[error("{0} has no columns")]
    NoColumns(PathBuf),

    /// No energy-like header and no numeric column to fall back on.
    #[error("no usable kwh column in {0}")]
    NoEnergyColumn(PathBuf),
}

/// Conditions that stop an ingestion run without producing a dataset.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("data folder '{0}' does not exist")]
    InputDirMissing(PathBuf),

    #[error("no .{extension} files found in '{dir}'")]
    NoInputFiles { dir: PathBuf, extension: String },

    #[error("no valid data loaded from '{dir}' ({attempted} files attempted, all skipped)")]
    NoValidData { dir: PathBuf, attempted: usize },

    #[error("could not list '{dir}': {source}")]
    ListDir {
        dir: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not write cleaned data to {path}: {source}")]
    Output {
        path: PathBuf,
        #[source]
        source: OutputError,
    },

    #[error("could not write ingestion log: {0}")]
    Log(#[from] std::io::Error),
}

/// Failures writing derived artifacts to disk.
#[derive(Error, Debug)]
pub enum OutputError {
    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_input_files_names_dir_and_extension() {
        let err = PipelineError::NoInputFiles {
            dir: PathBuf::from("data"),
            extension: "csv".to_string(),
        };
        assert_eq!(err.to_string(), "no .csv files found in 'data'");
    }

    #[test]
    fn test_no_valid_data_reports_attempt_count() {
        let err = PipelineError::NoValidData {
            dir: PathBuf::from("/meters"),
            attempted: 3,
        };
        let msg = err.to_string();
        assert!(msg.contains("/meters"));
        assert!(msg.contains("3 files attempted"));
    }

    #[test]
    fn test_no_energy_column_display() {
        let err = NormalizeError::NoEnergyColumn(PathBuf::from("data/lib_x.csv"));
        assert_eq!(err.to_string(), "no usable kwh column in data/lib_x.csv");
    }

    #[test]
    fn test_output_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: OutputError = io_err.into();
        assert!(err.to_string().contains("denied"));
    }
}

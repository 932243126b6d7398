use serde::Serialize;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tabled::{settings::Style, Table, Tabled};

use crate::error::OutputError;

fn ensure_parent(path: &Path) -> Result<(), OutputError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    Ok(())
}

/// Sibling path used while a file is being written.
fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(OsString::from).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Write all rows to a temp file, then rename it over `path`.
///
/// A failed write removes the temp file and leaves `path` untouched.
pub fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<(), OutputError> {
    ensure_parent(path)?;
    let tmp = temp_path(path);
    let written = write_rows(&tmp, rows)
        .and_then(|_| std::fs::rename(&tmp, path).map_err(OutputError::from));
    if written.is_err() {
        let _ = std::fs::remove_file(&tmp);
    }
    written
}

fn write_rows<T: Serialize>(path: &Path, rows: &[T]) -> Result<(), OutputError> {
    let mut wtr = csv::Writer::from_path(path)?;
    for r in rows {
        wtr.serialize(r)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), OutputError> {
    ensure_parent(path)?;
    let s = serde_json::to_string_pretty(value)?;
    std::fs::write(path, s)?;
    Ok(())
}

pub fn write_text(path: &Path, text: &str) -> Result<(), OutputError> {
    ensure_parent(path)?;
    std::fs::write(path, text)?;
    Ok(())
}

/// Markdown preview of the first `max_rows` rows.
pub fn preview_table<T>(rows: &[T], max_rows: usize) -> String
where
    T: Tabled + Clone,
{
    let slice: Vec<T> = rows.iter().take(max_rows).cloned().collect();
    if slice.is_empty() {
        return "(no rows)".to_string();
    }
    Table::new(slice).with(Style::markdown()).to_string()
}

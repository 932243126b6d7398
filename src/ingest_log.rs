//! Outcome log for one ingestion run.
//!
//! The sink is handed to the pipeline explicitly: it is created (truncated)
//! when a run starts and flushed when the run ends. Every line is also
//! emitted through `tracing` so console users see the same story.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use tracing::{error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Warning,
    Error,
}

pub struct IngestionLog<W: Write> {
    sink: W,
}

impl IngestionLog<BufWriter<File>> {
    /// Open `path` for a fresh run, discarding any previous contents.
    pub fn create(path: &Path) -> io::Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        Ok(Self::new(BufWriter::new(File::create(path)?)))
    }
}

impl<W: Write> IngestionLog<W> {
    pub fn new(sink: W) -> Self {
        Self { sink }
    }

    /// Append one line.
    pub fn record(&mut self, level: Level, message: &str) -> io::Result<()> {
        match level {
            Level::Info => info!("{}", message),
            Level::Warning => warn!("{}", message),
            Level::Error => error!("{}", message),
        }
        writeln!(self.sink, "{}", message)
    }

    pub fn info(&mut self, message: &str) -> io::Result<()> {
        self.record(Level::Info, message)
    }

    pub fn warning(&mut self, message: &str) -> io::Result<()> {
        self.record(Level::Warning, &format!("WARNING: {}", message))
    }

    pub fn error(&mut self, message: &str) -> io::Result<()> {
        self.record(Level::Error, &format!("ERROR: {}", message))
    }

    /// Flush and hand back the underlying sink.
    pub fn finish(mut self) -> io::Result<W> {
        self.sink.flush()?;
        Ok(self.sink)
    }
}

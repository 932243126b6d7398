//! Ingestion and aggregation of per-building energy meter exports.
//!
//! [`pipeline`] turns a folder of inconsistently formatted CSV exports into
//! one canonical `(timestamp, kwh, building)` dataset; [`aggregation`]
//! derives bucketed totals, building summaries and campus statistics from
//! any such dataset.

pub mod aggregation;
pub mod error;
pub mod ingest_log;
pub mod loader;
pub mod normalizer;
pub mod output;
pub mod pipeline;
pub mod report;
pub mod settings;
pub mod types;
pub mod util;

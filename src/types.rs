use chrono::{Datelike, Duration, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize, Serializer};
use tabled::Tabled;

/// Timestamp layout used in every persisted artifact.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Building label used when a name cannot be derived.
pub const UNKNOWN_BUILDING: &str = "Unknown";

/// Raw row of a persisted canonical dataset.
///
/// Every field is optional text so that a damaged file still loads row by row.
#[derive(Debug, Deserialize)]
pub struct RawCanonicalRow {
    pub timestamp: Option<String>,
    pub kwh: Option<String>,
    pub building: Option<String>,
}

/// One normalized meter reading.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CanonicalRecord {
    #[serde(serialize_with = "serialize_timestamp")]
    pub timestamp: NaiveDateTime,
    pub kwh: f64,
    pub building: String,
}

fn serialize_timestamp<S: Serializer>(ts: &NaiveDateTime, s: S) -> Result<S::Ok, S::Error> {
    s.collect_str(&ts.format(TIMESTAMP_FORMAT))
}

/// Width of a resampling bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Granularity {
    Hour,
    Day,
    /// Monday 00:00 through Sunday 23:59:59, labelled by the closing Sunday.
    Week,
}

impl Granularity {
    /// Start instant of the bucket containing `ts`.
    pub fn bucket_start(self, ts: NaiveDateTime) -> NaiveDateTime {
        let date = ts.date();
        match self {
            Granularity::Hour => date.and_time(NaiveTime::MIN) + Duration::hours(ts.hour() as i64),
            Granularity::Day => date.and_time(NaiveTime::MIN),
            Granularity::Week => {
                let back = date.weekday().num_days_from_monday() as i64;
                (date - Duration::days(back)).and_time(NaiveTime::MIN)
            }
        }
    }

    /// Human label for a bucket given its start instant.
    pub fn label(self, start: NaiveDateTime) -> String {
        match self {
            Granularity::Hour => start.format("%Y-%m-%d %H:00").to_string(),
            Granularity::Day => start.format("%Y-%m-%d").to_string(),
            Granularity::Week => (start.date() + Duration::days(6)).format("%Y-%m-%d").to_string(),
        }
    }
}

/// Summed consumption of one bucket.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BucketTotal {
    pub start: NaiveDateTime,
    pub kwh: f64,
}

/// Sparse, time-ascending series of bucket totals.
#[derive(Debug, Clone, PartialEq)]
pub struct BucketedSeries {
    pub granularity: Granularity,
    pub buckets: Vec<BucketTotal>,
}

impl BucketedSeries {
    /// `(label, kwh)` pairs in time order.
    pub fn labelled(&self) -> Vec<(String, f64)> {
        self.buckets
            .iter()
            .map(|b| (self.granularity.label(b.start), b.kwh))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}

/// Per-building statistics row.
#[derive(Debug, Clone, PartialEq, Serialize, Tabled)]
pub struct BuildingSummary {
    pub building: String,
    pub count: usize,
    #[tabled(display_with = "display_kwh")]
    pub total_kwh: f64,
    #[tabled(display_with = "display_kwh")]
    pub mean_kwh: f64,
    #[tabled(display_with = "display_kwh")]
    pub min_kwh: f64,
    #[tabled(display_with = "display_kwh")]
    pub max_kwh: f64,
}

fn display_kwh(v: &f64) -> String {
    crate::util::format_number(*v, 3)
}

/// Average weekly consumption of one building.
#[derive(Debug, Clone, PartialEq, Serialize, Tabled)]
pub struct WeeklyAverage {
    pub building: String,
    pub weeks: usize,
    #[tabled(display_with = "display_kwh")]
    pub avg_weekly_kwh: f64,
}

/// One of a building's busiest hours.
#[derive(Debug, Clone, PartialEq, Serialize, Tabled)]
pub struct HourlyPeak {
    pub building: String,
    pub rank: usize,
    pub hour: String,
    #[tabled(display_with = "display_kwh")]
    pub kwh: f64,
}

/// Campus-wide statistics, flat so it serializes to a key/value document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CampusStats {
    pub total_campus_kwh: f64,
    pub highest_building: Option<String>,
    pub highest_building_kwh: Option<f64>,
    pub peak_timestamp: Option<String>,
    pub peak_kwh_at_timestamp: Option<f64>,
    pub daily_totals_series: Vec<(String, f64)>,
    pub weekly_totals_series: Vec<(String, f64)>,
    pub last_week_total_kwh: Option<f64>,
    pub prev_week_total_kwh: Option<f64>,
    pub week_over_week_pct_change: Option<f64>,
}

/// What happened to one input file.
#[derive(Debug, Clone, PartialEq)]
pub enum FileStatus {
    Loaded { rows: usize, dropped: usize },
    Skipped { reason: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct FileOutcome {
    pub file: String,
    pub status: FileStatus,
}

impl FileOutcome {
    pub fn is_loaded(&self) -> bool {
        matches!(self.status, FileStatus::Loaded { .. })
    }
}

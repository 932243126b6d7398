//! Pure statistics over a canonical dataset.
//!
//! Every function here is total: an empty slice yields empty series and
//! absent campus figures, never an error. Grouping uses ordered maps so
//! repeated runs over the same records produce identical output.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use chrono::{Duration, NaiveDateTime};

use crate::types::{
    BucketTotal, BucketedSeries, BuildingSummary, CampusStats, CanonicalRecord, Granularity,
    HourlyPeak, WeeklyAverage, TIMESTAMP_FORMAT,
};
use crate::util::average;

/// Campus-wide sparse totals per bucket, oldest first.
pub fn bucketed_totals(data: &[CanonicalRecord], granularity: Granularity) -> BucketedSeries {
    bucketize(data.iter(), granularity)
}

/// Sparse totals per bucket for each building.
pub fn bucketed_totals_by_building(
    data: &[CanonicalRecord],
    granularity: Granularity,
) -> BTreeMap<String, BucketedSeries> {
    let mut groups: BTreeMap<&str, Vec<&CanonicalRecord>> = BTreeMap::new();
    for r in data {
        groups.entry(r.building.as_str()).or_default().push(r);
    }
    groups
        .into_iter()
        .map(|(building, rows)| (building.to_string(), bucketize(rows.into_iter(), granularity)))
        .collect()
}

fn bucketize<'a>(
    rows: impl Iterator<Item = &'a CanonicalRecord>,
    granularity: Granularity,
) -> BucketedSeries {
    let mut map: BTreeMap<NaiveDateTime, f64> = BTreeMap::new();
    for r in rows {
        *map.entry(granularity.bucket_start(r.timestamp)).or_insert(0.0) += r.kwh;
    }
    BucketedSeries {
        granularity,
        buckets: map
            .into_iter()
            .map(|(start, kwh)| BucketTotal { start, kwh })
            .collect(),
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct Acc {
    count: usize,
    total: f64,
    min: Option<f64>,
    max: Option<f64>,
}

impl Acc {
    fn add(mut self, kwh: f64) -> Self {
        self.count += 1;
        self.total += kwh;
        self.min = Some(self.min.map_or(kwh, |m| m.min(kwh)));
        self.max = Some(self.max.map_or(kwh, |m| m.max(kwh)));
        self
    }
}

fn totals_by_building(data: &[CanonicalRecord]) -> BTreeMap<&str, Acc> {
    data.iter().fold(BTreeMap::new(), |mut map, r| {
        let acc = map.entry(r.building.as_str()).or_insert_with(Acc::default);
        *acc = acc.add(r.kwh);
        map
    })
}

/// Highest total first; ties by building name ascending.
fn rank_desc(a_total: f64, a_name: &str, b_total: f64, b_name: &str) -> Ordering {
    b_total.total_cmp(&a_total).then_with(|| a_name.cmp(b_name))
}

/// Per-building count, sum, mean, min and max, ranked by total.
pub fn building_summaries(data: &[CanonicalRecord]) -> Vec<BuildingSummary> {
    let mut rows: Vec<BuildingSummary> = totals_by_building(data)
        .into_iter()
        .map(|(building, acc)| BuildingSummary {
            building: building.to_string(),
            count: acc.count,
            total_kwh: acc.total,
            mean_kwh: average(acc.total, acc.count),
            min_kwh: acc.min.unwrap_or(0.0),
            max_kwh: acc.max.unwrap_or(0.0),
        })
        .collect();
    rows.sort_by(|a, b| rank_desc(a.total_kwh, &a.building, b.total_kwh, &b.building));
    rows
}

/// Mean weekly consumption per building, ranked by that mean.
///
/// Weeks without readings inside a building's own first-to-last range count
/// as zero.
pub fn average_weekly_by_building(data: &[CanonicalRecord]) -> Vec<WeeklyAverage> {
    let mut rows: Vec<WeeklyAverage> = bucketed_totals_by_building(data, Granularity::Week)
        .into_iter()
        .map(|(building, series)| {
            let sum: f64 = series.buckets.iter().map(|b| b.kwh).sum();
            let weeks = match (series.buckets.first(), series.buckets.last()) {
                (Some(first), Some(last)) => (last.start - first.start).num_weeks() as usize + 1,
                _ => 0,
            };
            WeeklyAverage {
                building,
                weeks,
                avg_weekly_kwh: average(sum, weeks),
            }
        })
        .collect();
    rows.sort_by(|a, b| rank_desc(a.avg_weekly_kwh, &a.building, b.avg_weekly_kwh, &b.building));
    rows
}

/// The `top_n` busiest hours of each building, busiest first.
///
/// Buildings come in name order; equal hours keep time order.
pub fn peak_hours_by_building(data: &[CanonicalRecord], top_n: usize) -> Vec<HourlyPeak> {
    let mut peaks = Vec::new();
    for (building, series) in bucketed_totals_by_building(data, Granularity::Hour) {
        let mut hours = series.buckets;
        hours.sort_by(|a, b| b.kwh.total_cmp(&a.kwh));
        peaks.extend(hours.into_iter().take(top_n).enumerate().map(|(i, b)| HourlyPeak {
            building: building.clone(),
            rank: i + 1,
            hour: Granularity::Hour.label(b.start),
            kwh: b.kwh,
        }));
    }
    peaks
}

/// First key with the strictly greatest value, in key order.
fn arg_max<K: Copy>(items: impl Iterator<Item = (K, f64)>) -> Option<(K, f64)> {
    items.fold(None, |best, (k, v)| match best {
        Some((_, bv)) if v <= bv => best,
        _ => Some((k, v)),
    })
}

pub fn campus_stats(data: &[CanonicalRecord]) -> CampusStats {
    let total_campus_kwh: f64 = data.iter().map(|r| r.kwh).sum();

    let building_totals = totals_by_building(data);
    let highest = arg_max(building_totals.iter().map(|(b, acc)| (*b, acc.total)));

    let mut by_instant: BTreeMap<NaiveDateTime, f64> = BTreeMap::new();
    for r in data {
        *by_instant.entry(r.timestamp).or_insert(0.0) += r.kwh;
    }
    let peak = arg_max(by_instant.iter().map(|(ts, v)| (*ts, *v)));

    let daily = bucketed_totals(data, Granularity::Day);
    let weekly = bucketed_totals(data, Granularity::Week);

    // The previous week is the calendar week before the last bucket, zero
    // when it has no readings.
    let (last_week, prev_week, pct_change) = match weekly.buckets.as_slice() {
        [.., before, last] => {
            let prev_start = last.start - Duration::weeks(1);
            let prev = if before.start == prev_start { before.kwh } else { 0.0 };
            let pct = if prev == 0.0 {
                None
            } else {
                Some((last.kwh - prev) / prev * 100.0)
            };
            (Some(last.kwh), Some(prev), pct)
        }
        _ => (None, None, None),
    };

    CampusStats {
        total_campus_kwh,
        highest_building: highest.map(|(b, _)| b.to_string()),
        highest_building_kwh: highest.map(|(_, v)| v),
        peak_timestamp: peak.map(|(ts, _)| ts.format(TIMESTAMP_FORMAT).to_string()),
        peak_kwh_at_timestamp: peak.map(|(_, v)| v),
        daily_totals_series: daily.labelled(),
        weekly_totals_series: weekly.labelled(),
        last_week_total_kwh: last_week,
        prev_week_total_kwh: prev_week,
        week_over_week_pct_change: pct_change,
    }
}

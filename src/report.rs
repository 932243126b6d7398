//! Plain-text executive summary built from aggregation outputs only.

use crate::types::{BuildingSummary, CampusStats};
use crate::util::format_number;

const RECENT_DAYS: usize = 7;
const TOP_BUILDINGS: usize = 5;

pub fn render_summary(stats: &CampusStats, buildings: &[BuildingSummary]) -> String {
    let kwh = |v: f64| format_number(v, 3);
    let mut lines: Vec<String> = vec![
        "Campus Energy Usage - Executive Summary".to_string(),
        "=".repeat(40),
        format!("Total campus energy consumption: {} kWh", kwh(stats.total_campus_kwh)),
        String::new(),
    ];

    match (&stats.highest_building, stats.highest_building_kwh) {
        (Some(name), Some(v)) => lines.push(format!("Highest-consuming building: {} ({} kWh)", name, kwh(v))),
        _ => lines.push("Highest-consuming building: N/A".to_string()),
    }
    lines.push(String::new());

    match (&stats.peak_timestamp, stats.peak_kwh_at_timestamp) {
        (Some(ts), Some(v)) => lines.push(format!("Peak campus load occurred at: {} with {} kWh", ts, kwh(v))),
        _ => lines.push("Peak campus load: N/A".to_string()),
    }
    lines.push(String::new());

    match (stats.last_week_total_kwh, stats.prev_week_total_kwh) {
        (Some(last), Some(prev)) => {
            let pct = stats
                .week_over_week_pct_change
                .map(|p| format!("{:.2}%", p))
                .unwrap_or_else(|| "N/A (previous week total was 0)".to_string());
            lines.push("Weekly trend:".to_string());
            lines.push(format!("  Last week total: {} kWh", kwh(last)));
            lines.push(format!("  Previous week total: {} kWh", kwh(prev)));
            lines.push(format!("  Week-over-week change: {}", pct));
        }
        _ => lines.push("Weekly trend: Insufficient weekly data.".to_string()),
    }
    lines.push(String::new());

    lines.push(format!(
        "Daily totals (date : kWh), last {} days shown (or fewer if not available):",
        RECENT_DAYS
    ));
    let skip = stats.daily_totals_series.len().saturating_sub(RECENT_DAYS);
    for (day, v) in stats.daily_totals_series.iter().skip(skip) {
        lines.push(format!("  {} : {}", day, kwh(*v)));
    }
    lines.push(String::new());

    lines.push(format!("Top {} buildings by total consumption:", TOP_BUILDINGS));
    for b in buildings.iter().take(TOP_BUILDINGS) {
        lines.push(format!(
            "  {}: total {} kWh | mean {} | readings {}",
            b.building,
            kwh(b.total_kwh),
            kwh(b.mean_kwh),
            b.count
        ));
    }
    lines.push(String::new());

    lines.push("Notes:".to_string());
    lines.push(" - Readings with unparseable timestamps were dropped.".to_string());
    lines.push(" - Unparseable kWh values were replaced with 0.0.".to_string());
    lines.push(" - Weeks run Monday through Sunday and are labelled by their Sunday.".to_string());

    lines.join("\n")
}

//! Terminal report rendering.
//!
//! Formats ranked candidate windows and the ground-conditions assessment
//! into the plain-text reports the binary prints. Rendering returns
//! strings rather than printing so the output is testable.

use crate::saturation::SaturationReport;
use crate::CandidateWindow;
use chrono::{DateTime, Utc};

const RULE: &str = "============================================================";

/// Render the ranked-windows report.
///
/// `windows` must already be ranked best-first; `now` anchors the
/// today/upcoming split.
pub fn render_windows(location: &str, windows: &[CandidateWindow], now: DateTime<Utc>) -> String {
    let today = now.date_naive();
    let mut out = String::new();

    out.push_str(&format!("{}\n", RULE));
    out.push_str(&format!("ACTIVITY WINDOWS - {}\n", location));
    out.push_str(&format!("{}\n\n", RULE));

    if windows.is_empty() {
        out.push_str("[NO] No windows available today\n\n");
        out.push_str("Reason: No suitable high tide windows during daylight hours\n");
        return out;
    }

    let today_windows: Vec<&CandidateWindow> = windows
        .iter()
        .filter(|w| w.tide_time.date_naive() == today)
        .collect();

    // Next few days, drawn from the top of the ranking
    let upcoming: Vec<&CandidateWindow> = windows
        .iter()
        .take(5)
        .filter(|w| w.tide_time.date_naive() >= today)
        .collect();

    if let Some(best) = today_windows.first() {
        out.push_str("[YES] Window available TODAY!\n\n");
        out.push_str(&format!(
            "High Tide: {} ({:.2}m)\n",
            best.tide_time.format("%H:%M"),
            best.tide_height_m
        ));
        out.push_str(&format!(
            "Best Window: {} - {}\n",
            best.window_start.format("%H:%M"),
            best.window_end.format("%H:%M")
        ));
        out.push_str(&format!(
            "Weather: {} ({:.1}°C)\n",
            best.weather_desc, best.temperature_c
        ));
        out.push_str(&format!("Rain Probability: {}%\n", best.rain_probability_pct));
        out.push_str(&format!("Cloud Cover: {}%\n", best.cloud_cover_pct));
        out.push_str(&format!("Rating: {}\n", best.rating()));

        if today_windows.len() > 1 {
            out.push_str(&format!(
                "\nNote: {} tide windows available today\n",
                today_windows.len()
            ));
        }

        if !upcoming.is_empty() {
            out.push_str("\nUpcoming windows (next 5):\n");
            push_upcoming(&mut out, &upcoming);
        }
    } else {
        out.push_str("[NO] No windows available today\n\n");

        if let Some(next) = upcoming.first() {
            out.push_str("Next available window:\n");
            out.push_str(&format!(
                "  Date: {}\n",
                next.tide_time.format("%A, %B %d, %Y")
            ));
            out.push_str(&format!(
                "  Time: {} - {}\n",
                next.window_start.format("%H:%M"),
                next.window_end.format("%H:%M")
            ));
            out.push_str(&format!(
                "  Weather: {} ({:.1}°C)\n",
                next.weather_desc, next.temperature_c
            ));
            out.push_str(&format!("  Rating: {}\n", next.rating()));

            out.push_str("\nAll upcoming windows:\n");
            push_upcoming(&mut out, &upcoming);
        } else {
            out.push_str("Reason: No suitable windows in the next few days\n");
        }
    }

    out
}

fn push_upcoming(out: &mut String, upcoming: &[&CandidateWindow]) {
    for (i, w) in upcoming.iter().enumerate() {
        out.push_str(&format!(
            "  {}. {} at {} - {} ({})\n",
            i + 1,
            w.tide_time.format("%A, %b %d"),
            w.tide_time.format("%H:%M"),
            w.weather_desc,
            w.rating()
        ));
    }
}

/// Render the ground-conditions report for a `days_back`-day rainfall
/// look-back.
pub fn render_ground_report(location: &str, report: &SaturationReport, days_back: u32) -> String {
    let mut out = String::new();

    out.push_str(&format!("{}\n", RULE));
    out.push_str(&format!("GROUND CONDITIONS - {}\n", location));
    out.push_str(&format!("(Based on past {} days of rainfall)\n", days_back));
    out.push_str(&format!("{}\n\n", RULE));

    out.push_str("Rainfall Summary:\n");
    out.push_str(&format!("  Last 24 hours: {:.1} mm\n", report.last_24h_mm));
    out.push_str(&format!(
        "  Last {} days total: {:.1} mm\n",
        days_back, report.total_mm
    ));
    out.push_str(&format!(
        "  Daily average: {:.1} mm/day\n",
        report.average_daily_mm()
    ));

    if !report.daily_totals.is_empty() {
        out.push_str("\nDaily breakdown (most recent last):\n");
        let days = report.daily_totals.len();
        for (i, daily) in report.daily_totals.iter().enumerate() {
            let days_ago = days - i - 1;
            let label = match days_ago {
                0 => "Today".to_string(),
                1 => "Yesterday".to_string(),
                n => format!("{} days ago", n),
            };
            out.push_str(&format!("  {}: {:.1} mm\n", label, daily));
        }
    }

    out.push_str("\nGROUND CONDITION ASSESSMENT:\n");
    out.push_str(&format!("  Status: {}\n", report.condition));
    out.push_str(&format!("  Advice: {}\n", report.condition.advice()));

    out
}

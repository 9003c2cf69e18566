//! # Tide Windows Application Entry Point
//!
//! Loads configuration, queries the tide, weather and sunlight feeds, and
//! prints ranked activity windows (and, on request, the ground-conditions
//! assessment) to the terminal.

// Test modules
#[cfg(test)]
mod tests;

use anyhow::Context;
use std::env;
use std::time::Duration;
use tide_window_lib::config::Config;
use tide_window_lib::sunlight_feed::SunlightFeed;
use tide_window_lib::tide_feed::TideFeed;
use tide_window_lib::weather_feed::WeatherFeed;
use tide_window_lib::{display, saturation, window_finder};

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = Config::load();
    let args: Vec<String> = env::args().skip(1).collect();

    match args.first().map(String::as_str) {
        None => print_windows(&config)?,
        Some("ground") => {
            let days_back = parse_days(args.get(1), config.query.rainfall_days_back)?;
            print_ground(&config, days_back)?;
        }
        Some("full") => {
            print_windows(&config)?;
            print_ground(&config, config.query.rainfall_days_back)?;
        }
        Some(other) => {
            eprintln!("Unknown command: {}", other);
            eprintln!();
            eprintln!("Usage:");
            eprintln!("  tide-windows                 - ranked tide windows");
            eprintln!("  tide-windows ground [days]   - ground conditions from past rainfall");
            eprintln!("  tide-windows full            - both reports");
            std::process::exit(2);
        }
    }

    Ok(())
}

/// Fetch, rank and print the tide-window report.
///
/// Tide or weather feed failures abort with an error; a window-less result
/// is still a report ("no windows available").
fn print_windows(config: &Config) -> anyhow::Result<()> {
    let timeout = Duration::from_secs(config.feeds.timeout_secs);
    let tides = TideFeed::new(config.feeds.tide_api_key(), timeout)?;
    let weather = WeatherFeed::new(timeout)?;
    let sunlight = SunlightFeed::new(
        config.location.latitude,
        config.location.longitude,
        timeout,
    )?;

    let windows = window_finder::find_best_tide_windows(
        &tides,
        &weather,
        &sunlight,
        config.location.latitude,
        config.location.longitude,
        config.query.days_ahead,
    )
    .context("fetching tide windows")?;

    print!(
        "{}",
        display::render_windows(&config.location.name, &windows, chrono::Utc::now())
    );
    Ok(())
}

/// Fetch the rainfall history and print the ground-conditions report.
fn print_ground(config: &Config, days_back: u32) -> anyhow::Result<()> {
    let timeout = Duration::from_secs(config.feeds.timeout_secs);
    let weather = WeatherFeed::new(timeout)?;

    let rainfall = weather
        .fetch_recent_rainfall(
            config.location.latitude,
            config.location.longitude,
            days_back,
        )
        .context("fetching rainfall history")?;

    let report = saturation::assess(&rainfall);
    print!(
        "{}",
        display::render_ground_report(&config.location.name, &report, days_back)
    );
    Ok(())
}

fn parse_days(arg: Option<&String>, default: u32) -> anyhow::Result<u32> {
    match arg {
        None => Ok(default),
        Some(s) => s
            .parse()
            .with_context(|| format!("invalid day count {:?}", s)),
    }
}

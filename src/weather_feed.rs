//! Open-Meteo weather adapter.
//!
//! Two queries live here: the hourly forecast consumed by the window
//! builder (temperature, precipitation probability, weather code, cloud
//! cover) and the historical hourly precipitation series behind the
//! ground-saturation assessment. Both come back as parallel arrays keyed by
//! an ISO-8601 `time` array, which this module flattens into typed records
//! at the boundary.

use crate::{FeedError, WeatherSample};
use chrono::{NaiveDateTime, Utc};
use serde::Deserialize;
use std::time::Duration;

const FORECAST_URL: &str = "https://api.open-meteo.com/v1/forecast";
const ARCHIVE_URL: &str = "https://archive-api.open-meteo.com/v1/archive";

/// Hour timestamps arrive as "2024-06-15T13:00"
const HOUR_FORMAT: &str = "%Y-%m-%dT%H:%M";

/// Blocking client for the Open-Meteo forecast and archive endpoints.
pub struct WeatherFeed {
    client: reqwest::blocking::Client,
}

impl WeatherFeed {
    /// Build a feed client with a bounded per-request timeout.
    pub fn new(timeout: Duration) -> Result<Self, FeedError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()?;
        Ok(Self { client })
    }

    /// Fetch hourly weather samples for `days` days starting today.
    ///
    /// Hours with no temperature or weather code are dropped; missing
    /// probability or cloud values default to 0. An empty sample list is a
    /// valid response, not an error.
    pub fn fetch_hourly(
        &self,
        lat: f64,
        lon: f64,
        days: u32,
    ) -> Result<Vec<WeatherSample>, FeedError> {
        let url = format!(
            "{}?latitude={:.4}&longitude={:.4}\
             &hourly=temperature_2m,precipitation_probability,weathercode,cloudcover\
             &forecast_days={}&timezone=UTC",
            FORECAST_URL, lat, lon, days
        );

        let body = self.client.get(&url).send()?.error_for_status()?.text()?;
        let samples = parse_hourly(&body)?;
        log::debug!("weather feed returned {} hourly samples", samples.len());
        Ok(samples)
    }

    /// Fetch the hourly precipitation series for the `days_back` days up to
    /// today, in millimeters. Hours the archive has no value for are kept
    /// as `None` so the caller can decide how to treat them.
    pub fn fetch_recent_rainfall(
        &self,
        lat: f64,
        lon: f64,
        days_back: u32,
    ) -> Result<Vec<Option<f64>>, FeedError> {
        let end = Utc::now().date_naive();
        let start = end - chrono::Duration::days(days_back as i64);
        let url = format!(
            "{}?latitude={:.4}&longitude={:.4}\
             &start_date={}&end_date={}&hourly=precipitation&timezone=UTC",
            ARCHIVE_URL, lat, lon, start, end
        );

        let body = self.client.get(&url).send()?.error_for_status()?.text()?;
        parse_rainfall(&body)
    }
}

#[derive(Deserialize)]
struct ForecastPayload {
    hourly: HourlyBlock,
}

/// Parallel hourly arrays as Open-Meteo delivers them. Individual entries
/// may be null, so every value array is `Option` per element.
#[derive(Deserialize)]
struct HourlyBlock {
    time: Vec<String>,
    #[serde(default)]
    temperature_2m: Vec<Option<f64>>,
    #[serde(default)]
    precipitation_probability: Vec<Option<f64>>,
    #[serde(default)]
    weathercode: Vec<Option<u16>>,
    #[serde(default)]
    cloudcover: Vec<Option<f64>>,
}

#[derive(Deserialize)]
struct ArchivePayload {
    hourly: RainfallBlock,
}

#[derive(Deserialize)]
struct RainfallBlock {
    #[serde(default)]
    precipitation: Vec<Option<f64>>,
}

fn parse_hourly(body: &str) -> Result<Vec<WeatherSample>, FeedError> {
    let payload: ForecastPayload = serde_json::from_str(body).map_err(|e| FeedError::Payload {
        feed: "weather",
        detail: e.to_string(),
    })?;
    let hourly = payload.hourly;

    let mut samples = Vec::with_capacity(hourly.time.len());
    for (i, time) in hourly.time.iter().enumerate() {
        let timestamp = NaiveDateTime::parse_from_str(time, HOUR_FORMAT)
            .map_err(|_| FeedError::Payload {
                feed: "weather",
                detail: format!("bad hour timestamp {:?}", time),
            })?
            .and_utc();

        // An hour without temperature or code carries nothing the
        // classifier can use; skip it rather than invent values.
        let (Some(temperature_c), Some(weather_code)) = (
            hourly.temperature_2m.get(i).copied().flatten(),
            hourly.weathercode.get(i).copied().flatten(),
        ) else {
            continue;
        };

        let rain_probability_pct = hourly
            .precipitation_probability
            .get(i)
            .copied()
            .flatten()
            .unwrap_or(0.0)
            .clamp(0.0, 100.0)
            .round() as u8;
        let cloud_cover_pct = hourly
            .cloudcover
            .get(i)
            .copied()
            .flatten()
            .unwrap_or(0.0)
            .clamp(0.0, 100.0)
            .round() as u8;

        samples.push(WeatherSample {
            timestamp,
            temperature_c,
            rain_probability_pct,
            weather_code,
            cloud_cover_pct,
        });
    }

    Ok(samples)
}

fn parse_rainfall(body: &str) -> Result<Vec<Option<f64>>, FeedError> {
    let payload: ArchivePayload = serde_json::from_str(body).map_err(|e| FeedError::Payload {
        feed: "weather",
        detail: e.to_string(),
    })?;
    Ok(payload.hourly.precipitation)
}

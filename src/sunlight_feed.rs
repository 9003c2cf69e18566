//! # Sunrise/Sunset Feed with Seasonal Fallback
//!
//! Daylight intervals come from the sunrise-sunset.org JSON API. Unlike the
//! tide and weather feeds, this adapter never fails its caller: any fetch
//! or parse problem is logged and answered with [`seasonal_daylight`], a
//! fixed approximation keyed by month. A dead sunrise/sunset service
//! degrades the accuracy of window clipping, it does not abort the
//! computation.
//!
//! The fallback lives in its own pure function, outside the network path,
//! so its policy is testable in isolation.

use crate::{DaylightInterval, FeedError};
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::Deserialize;
use std::time::Duration;

const SUNRISE_SUNSET_URL: &str = "https://api.sunrise-sunset.org/json";

/// Blocking client for the sunrise-sunset.org API.
pub struct SunlightFeed {
    client: reqwest::blocking::Client,
    lat: f64,
    lon: f64,
}

impl SunlightFeed {
    /// Build a feed client for one coordinate with a bounded per-request
    /// timeout.
    pub fn new(lat: f64, lon: f64, timeout: Duration) -> Result<Self, FeedError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()?;
        Ok(Self { client, lat, lon })
    }

    /// Daylight interval for one calendar date.
    ///
    /// Infallible by design: feed failures are absorbed here and replaced
    /// with the seasonal approximation.
    pub fn daylight_for(&self, date: NaiveDate) -> DaylightInterval {
        match self.fetch_daylight(date) {
            Ok(interval) => interval,
            Err(e) => {
                log::warn!(
                    "sunlight feed failed for {}: {}; using seasonal approximation",
                    date,
                    e
                );
                seasonal_daylight(date)
            }
        }
    }

    fn fetch_daylight(&self, date: NaiveDate) -> Result<DaylightInterval, FeedError> {
        let url = format!(
            "{}?lat={:.4}&lng={:.4}&date={}&formatted=0",
            SUNRISE_SUNSET_URL, self.lat, self.lon, date
        );

        let body = self.client.get(&url).send()?.error_for_status()?.text()?;
        parse_daylight(&body, date)
    }
}

#[derive(Deserialize)]
struct SunrisePayload {
    results: SunriseResults,
    status: String,
}

#[derive(Deserialize)]
struct SunriseResults {
    sunrise: String,
    sunset: String,
}

fn parse_daylight(body: &str, date: NaiveDate) -> Result<DaylightInterval, FeedError> {
    let payload: SunrisePayload = serde_json::from_str(body).map_err(|e| FeedError::Payload {
        feed: "sunlight",
        detail: e.to_string(),
    })?;

    if payload.status != "OK" {
        return Err(FeedError::Payload {
            feed: "sunlight",
            detail: format!("status {:?}", payload.status),
        });
    }

    let parse_instant = |field: &str, value: &str| {
        DateTime::parse_from_rfc3339(value)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|_| FeedError::Payload {
                feed: "sunlight",
                detail: format!("bad {} instant {:?}", field, value),
            })
    };

    Ok(DaylightInterval {
        date,
        sunrise: parse_instant("sunrise", &payload.results.sunrise)?,
        sunset: parse_instant("sunset", &payload.results.sunset)?,
    })
}

/// Fixed seasonal daylight approximation, keyed by month bucket:
/// Nov-Feb 08:30-16:30, May-Aug 05:30-21:30, otherwise 07:00-19:00.
///
/// Deliberately coarse. It exists so the window finder keeps producing
/// usable windows when the sunrise/sunset service is down, and it errs
/// toward the short side in winter so clipped windows stay inside real
/// daylight.
pub fn seasonal_daylight(date: NaiveDate) -> DaylightInterval {
    let (rise, set) = match date.month() {
        11 | 12 | 1 | 2 => ((8, 30), (16, 30)),
        5..=8 => ((5, 30), (21, 30)),
        _ => ((7, 0), (19, 0)),
    };

    let at = |(h, m): (u32, u32)| {
        date.and_hms_opt(h, m, 0)
            .expect("fixed clock time is valid")
            .and_utc()
    };

    DaylightInterval {
        date,
        sunrise: at(rise),
        sunset: at(set),
    }
}

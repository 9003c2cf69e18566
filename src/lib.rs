//! # Tide Window Core Library
//!
//! This library finds and ranks daylight activity windows around high tide.
//! It merges three independent feeds for a coordinate and day range:
//!
//! - discrete high/low tide extrema (timestamp + height),
//! - hourly weather samples (temperature, rain probability, weather code,
//!   cloud cover),
//! - sunrise/sunset times per calendar date.
//!
//! ## Data Flow
//!
//! 1. **Fetch**: the feed adapters ([`tide_feed`], [`weather_feed`],
//!    [`sunlight_feed`]) download and parse their JSON payloads into the
//!    typed records below. Loosely-typed payload handling stays inside the
//!    adapters; everything downstream works on explicit records.
//! 2. **Build**: [`window_finder::build_candidate_windows`] turns each high
//!    tide into a daylight-clipped candidate window with the nearest hourly
//!    weather sample attached.
//! 3. **Rank**: [`window_finder::rank_windows`] scores and sorts the
//!    candidates, best first.
//!
//! The whole pipeline is a stateless, synchronous transform: every call
//! fetches fresh data, nothing is persisted, and repeated or concurrent
//! calls do not coordinate.
//!
//! ## Failure Model
//!
//! Tide and weather fetch failures surface as [`FeedError`] and abort the
//! call. The sunlight feed instead degrades to a fixed seasonal
//! approximation ([`sunlight_feed::seasonal_daylight`]), so a dead
//! sunrise/sunset service never takes the whole computation down. An empty
//! result is not an error: it means no high tide overlapped daylight in the
//! requested range.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod config;
pub mod display;
pub mod saturation;
pub mod sunlight_feed;
pub mod tide_feed;
pub mod weather_feed;
pub mod window_finder;

/// Error raised by the feed adapters when an upstream service cannot be
/// reached or returns a payload that does not parse.
///
/// This is a terminal failure for the tide and weather feeds: the caller
/// gets no partial results. It is distinct from an empty-but-successful
/// response, which the adapters report as an empty vector.
#[derive(Error, Debug)]
pub enum FeedError {
    /// HTTP request failed (network, timeout, or server error)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body did not match the expected payload shape
    #[error("unexpected {feed} payload: {detail}")]
    Payload {
        feed: &'static str,
        detail: String,
    },
}

/// Whether a tide extreme is a local maximum or minimum of sea level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TideKind {
    High,
    Low,
}

/// A single tide extreme reported by the tide feed.
///
/// Immutable once fetched and scoped to one query; this library never
/// persists tide data.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct TideExtreme {
    /// Instant of the extreme
    pub timestamp: DateTime<Utc>,
    /// High or low water
    pub kind: TideKind,
    /// Height in meters above the feed's datum
    pub height_m: f64,
}

/// One hourly weather sample for a coordinate.
///
/// Samples are keyed by timestamp; the window builder picks the sample
/// nearest to each high tide by absolute time distance.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct WeatherSample {
    /// Instant the sample is valid for (top of the hour)
    pub timestamp: DateTime<Utc>,
    /// Air temperature in degrees Celsius
    pub temperature_c: f64,
    /// Precipitation probability, 0-100
    pub rain_probability_pct: u8,
    /// WMO weather code (0 = clear sky, 1-3 = partly cloudy, ...)
    pub weather_code: u16,
    /// Total cloud cover, 0-100
    pub cloud_cover_pct: u8,
}

/// Sunrise and sunset for one calendar date at one coordinate.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct DaylightInterval {
    pub date: NaiveDate,
    pub sunrise: DateTime<Utc>,
    pub sunset: DateTime<Utc>,
}

/// Coarse weather description attached to a candidate window.
///
/// Derived from the classification flags, except that a rain probability
/// above 50% forces `Rainy` regardless of the flags.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum WeatherDesc {
    Sunny,
    Clear,
    Cloudy,
    Rainy,
}

impl std::fmt::Display for WeatherDesc {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            WeatherDesc::Sunny => "Sunny",
            WeatherDesc::Clear => "Clear",
            WeatherDesc::Cloudy => "Cloudy",
            WeatherDesc::Rainy => "Rainy",
        };
        write!(f, "{}", s)
    }
}

/// Text rating for a window, used by the report renderer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Rating {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl std::fmt::Display for Rating {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Rating::Excellent => "EXCELLENT",
            Rating::Good => "GOOD",
            Rating::Fair => "FAIR",
            Rating::Poor => "POOR",
        };
        write!(f, "{}", s)
    }
}

/// A scored, daylight-clipped time range centered on a high tide.
///
/// Constructed fresh per call by the window builder, never mutated
/// afterwards, and consumed immediately by ranking and display. The window
/// always satisfies `sunrise <= window_start < window_end <= sunset`.
///
/// # Example
/// ```
/// use chrono::{TimeZone, Utc};
/// use tide_window_lib::{CandidateWindow, WeatherDesc};
///
/// let tide_time = Utc.with_ymd_and_hms(2024, 6, 15, 13, 0, 0).unwrap();
/// let window = CandidateWindow {
///     tide_time,
///     tide_height_m: 3.8,
///     window_start: tide_time - chrono::Duration::minutes(90),
///     window_end: tide_time + chrono::Duration::minutes(90),
///     sunrise: Utc.with_ymd_and_hms(2024, 6, 15, 5, 30, 0).unwrap(),
///     sunset: Utc.with_ymd_and_hms(2024, 6, 15, 21, 30, 0).unwrap(),
///     is_sunny: true,
///     is_clear: true,
///     is_dry: true,
///     weather_desc: WeatherDesc::Sunny,
///     temperature_c: 18.5,
///     rain_probability_pct: 5,
///     cloud_cover_pct: 20,
/// };
///
/// assert_eq!(window.duration_minutes(), 180);
/// ```
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct CandidateWindow {
    /// Instant of the high tide this window is centered on
    pub tide_time: DateTime<Utc>,
    /// High-water height in meters
    pub tide_height_m: f64,
    /// Start of the daylight-clipped window
    pub window_start: DateTime<Utc>,
    /// End of the daylight-clipped window
    pub window_end: DateTime<Utc>,
    /// Sunrise on the tide's date
    pub sunrise: DateTime<Utc>,
    /// Sunset on the tide's date
    pub sunset: DateTime<Utc>,
    /// Weather code in {0, 1} and cloud cover below 40%
    pub is_sunny: bool,
    /// Weather code in {0..=3} and cloud cover below 60%
    pub is_clear: bool,
    /// Rain probability below 30%
    pub is_dry: bool,
    /// Coarse description derived from the flags (Rainy may override)
    pub weather_desc: WeatherDesc,
    /// Temperature of the nearest weather sample
    pub temperature_c: f64,
    /// Rain probability of the nearest weather sample
    pub rain_probability_pct: u8,
    /// Cloud cover of the nearest weather sample
    pub cloud_cover_pct: u8,
}

impl CandidateWindow {
    /// Length of the clipped window in whole minutes.
    pub fn duration_minutes(&self) -> i64 {
        (self.window_end - self.window_start).num_minutes()
    }

    /// Text rating for display: sunny and dry is excellent, clear and dry
    /// is good, merely dry is fair, anything wet is poor.
    pub fn rating(&self) -> Rating {
        if self.is_sunny && self.is_dry {
            Rating::Excellent
        } else if self.is_clear && self.is_dry {
            Rating::Good
        } else if self.is_dry {
            Rating::Fair
        } else {
            Rating::Poor
        }
    }
}

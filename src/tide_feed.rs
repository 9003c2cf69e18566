//! # Tide Extrema Fetching
//!
//! This module handles network operations for fetching predicted high/low
//! water events from the WorldTides extremes API.
//!
//! ## Data Source
//!
//! ### WorldTides
//! - **URL**: https://www.worldtides.info/api/v3
//! - **Query**: `extremes` for a lat/lon and day count
//! - **Format**: JSON, epoch-second timestamps, heights in meters
//! - **Credential**: API key, from config or the WORLDTIDES_API_KEY
//!   environment variable
//!
//! ## Error Handling
//!
//! Network failures, HTTP error statuses and unparseable payloads all
//! surface as [`FeedError`] and abort the caller's computation; there is no
//! retry here. An empty `extremes` array is a successful response and comes
//! back as an empty vector, which downstream code reads as "no data", not
//! as an error.

use crate::{FeedError, TideExtreme, TideKind};
use chrono::{TimeZone, Utc};
use serde::Deserialize;
use std::time::Duration;

const WORLDTIDES_URL: &str = "https://www.worldtides.info/api/v3";

/// Blocking client for the WorldTides extremes endpoint.
pub struct TideFeed {
    client: reqwest::blocking::Client,
    api_key: String,
}

impl TideFeed {
    /// Build a feed client with a bounded per-request timeout. A request
    /// that exceeds the timeout fails with [`FeedError::Http`] rather than
    /// hanging.
    pub fn new(api_key: String, timeout: Duration) -> Result<Self, FeedError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()?;
        Ok(Self { client, api_key })
    }

    /// Fetch predicted tide extrema for `days` days starting today.
    ///
    /// # Returns
    /// - `Ok(Vec<TideExtreme>)`: parsed events, possibly empty
    /// - `Err(FeedError)`: the feed could not be reached or its payload did
    ///   not parse
    pub fn fetch_extrema(
        &self,
        lat: f64,
        lon: f64,
        days: u32,
    ) -> Result<Vec<TideExtreme>, FeedError> {
        let url = format!(
            "{}?extremes&lat={:.4}&lon={:.4}&days={}&key={}",
            WORLDTIDES_URL, lat, lon, days, self.api_key
        );

        let body = self
            .client
            .get(&url)
            .send()?
            .error_for_status()?
            .text()?;

        let extrema = parse_extrema(&body)?;
        log::debug!("tide feed returned {} extrema", extrema.len());
        Ok(extrema)
    }
}

/// WorldTides extremes payload. Only the fields the scorer needs are kept;
/// the rest of the response is ignored.
#[derive(Deserialize)]
struct ExtremesPayload {
    #[serde(default)]
    extremes: Vec<RawExtreme>,
}

#[derive(Deserialize)]
struct RawExtreme {
    dt: i64,
    height: f64,
    #[serde(rename = "type")]
    kind: String,
}

/// Parse the raw response body into typed tide events.
///
/// All defensive handling of the loosely-typed payload happens here, at the
/// adapter boundary; the window finder never sees optional or stringly
/// fields.
fn parse_extrema(body: &str) -> Result<Vec<TideExtreme>, FeedError> {
    let payload: ExtremesPayload = serde_json::from_str(body).map_err(|e| FeedError::Payload {
        feed: "tide",
        detail: e.to_string(),
    })?;

    payload
        .extremes
        .into_iter()
        .map(|raw| {
            let timestamp = Utc
                .timestamp_opt(raw.dt, 0)
                .single()
                .ok_or_else(|| FeedError::Payload {
                    feed: "tide",
                    detail: format!("timestamp {} out of range", raw.dt),
                })?;
            let kind = match raw.kind.as_str() {
                "High" => TideKind::High,
                "Low" => TideKind::Low,
                other => {
                    return Err(FeedError::Payload {
                        feed: "tide",
                        detail: format!("unknown extreme type {:?}", other),
                    })
                }
            };
            Ok(TideExtreme {
                timestamp,
                kind,
                height_m: raw.height,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID_RESPONSE: &str = r#"{
        "status": 200,
        "callCount": 1,
        "requestLat": 53.3498,
        "requestLon": -6.2603,
        "responseLat": 53.3498,
        "responseLon": -6.2603,
        "atlas": "TPXO",
        "extremes": [
            {"dt": 1718451000, "date": "2024-06-15T11:30+0000", "height": 1.82, "type": "High"},
            {"dt": 1718473500, "date": "2024-06-15T17:45+0000", "height": -1.65, "type": "Low"},
            {"dt": 1718496300, "date": "2024-06-16T00:05+0000", "height": 1.74, "type": "High"}
        ]
    }"#;

    #[test]
    fn test_parse_valid_response() {
        let extrema = parse_extrema(VALID_RESPONSE).expect("valid payload should parse");
        assert_eq!(extrema.len(), 3);

        assert_eq!(extrema[0].kind, TideKind::High);
        assert_eq!(extrema[0].timestamp.timestamp(), 1718451000);
        assert!((extrema[0].height_m - 1.82).abs() < 1e-9);

        assert_eq!(extrema[1].kind, TideKind::Low);
        assert!(extrema[1].height_m < 0.0);
    }

    #[test]
    fn test_parse_empty_extremes_is_success() {
        let extrema = parse_extrema(r#"{"status": 200, "extremes": []}"#).unwrap();
        assert!(extrema.is_empty(), "empty extremes should be Ok, not Err");

        // A payload without the array at all also counts as empty
        let extrema = parse_extrema(r#"{"status": 200}"#).unwrap();
        assert!(extrema.is_empty());
    }

    #[test]
    fn test_parse_unknown_extreme_type() {
        let body = r#"{"extremes": [{"dt": 1718451000, "height": 1.0, "type": "Slack"}]}"#;
        let err = parse_extrema(body).unwrap_err();
        assert!(matches!(err, FeedError::Payload { feed: "tide", .. }));
    }

    #[test]
    fn test_parse_malformed_json() {
        assert!(parse_extrema("{ not json").is_err());
    }
}

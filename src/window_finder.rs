//! # Tide Window Building and Ranking
//!
//! The heart of the library: merges discrete tide extrema with hourly
//! weather samples and per-date daylight intervals into scored, ranked
//! candidate windows.
//!
//! ## Window Construction
//!
//! For every *high* tide event:
//!
//! 1. Resolve the daylight interval for the tide's date. The resolver is
//!    called once per distinct date and memoized for the rest of the pass.
//! 2. Take the raw window `[tide - 90min, tide + 90min]`.
//! 3. Clip it to `[sunrise, sunset]`. If the clipped range is empty the
//!    tide is skipped outright; an unswimmable midnight high water is not
//!    an error.
//! 4. Attach the weather sample nearest to the tide instant (linear scan;
//!    ties keep the first-encountered sample, which for a time-sorted feed
//!    is the earliest hour).
//! 5. Classify: sunny (code 0-1, cloud < 40%), clear (code 0-3,
//!    cloud < 60%), dry (rain probability < 30%). The description follows
//!    the flags, except that rain probability above 50% forces `Rainy`,
//!    even for a window whose flags say sunny.
//!
//! ## Scoring
//!
//! ```text
//! score = 100*[sunny] + 50*[clear] + 30*[dry]
//!       - rain_probability - cloud_cover / 2
//!       + window_minutes / 10
//! ```
//!
//! Sunniness dominates, dryness is a secondary bonus, and a longer
//! daylight-clipped window is mildly favored: a full 180-minute window
//! earns +18 against a half-clipped window's +9, small next to the weather
//! terms. Ranking sorts descending by score with a stable sort, so
//! equal-scoring windows keep their input order.

use crate::sunlight_feed::SunlightFeed;
use crate::tide_feed::TideFeed;
use crate::weather_feed::WeatherFeed;
use crate::{
    CandidateWindow, DaylightInterval, FeedError, TideExtreme, TideKind, WeatherDesc,
    WeatherSample,
};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use std::collections::HashMap;

/// Half-width of the raw window around a high tide, in minutes.
const WINDOW_HALF_WIDTH_MIN: i64 = 90;

/// Cloud cover must stay below this for a code-0/1 hour to count as sunny.
const SUNNY_MAX_CLOUD_PCT: u8 = 40;
/// Cloud cover must stay below this for a code-0..=3 hour to count as clear.
const CLEAR_MAX_CLOUD_PCT: u8 = 60;
/// Rain probability must stay below this to count as dry.
const DRY_MAX_RAIN_PCT: u8 = 30;
/// Rain probability strictly above this forces the Rainy description.
const RAINY_OVERRIDE_PCT: u8 = 50;

/// Source of daylight intervals, one per calendar date.
///
/// Satisfied by any `Fn(NaiveDate) -> DaylightInterval` through the
/// blanket impl below, so the HTTP adapter ([`SunlightFeed`]) plugs in as
/// a closure and tests substitute fixed intervals the same way.
pub trait DaylightResolver {
    fn daylight_for(&self, date: NaiveDate) -> DaylightInterval;
}

impl<F> DaylightResolver for F
where
    F: Fn(NaiveDate) -> DaylightInterval,
{
    fn daylight_for(&self, date: NaiveDate) -> DaylightInterval {
        self(date)
    }
}

/// Fetch, build and rank windows for a coordinate over the next `days`
/// days.
///
/// Tide or weather feed failures abort the whole call with [`FeedError`];
/// there are no partial results. An `Ok` with an empty vector means no
/// high tide overlapped daylight in the range, which callers should treat
/// as "nothing suitable", not as a failure.
pub fn find_best_tide_windows(
    tides: &TideFeed,
    weather: &WeatherFeed,
    sunlight: &SunlightFeed,
    lat: f64,
    lon: f64,
    days: u32,
) -> Result<Vec<CandidateWindow>, FeedError> {
    let extrema = tides.fetch_extrema(lat, lon, days)?;
    let samples = weather.fetch_hourly(lat, lon, days)?;

    let windows =
        build_candidate_windows(&extrema, &samples, &|date| sunlight.daylight_for(date));
    log::info!(
        "{} of {} tide extrema produced daylight windows",
        windows.len(),
        extrema.len()
    );

    Ok(rank_windows(windows))
}

/// Build one daylight-clipped candidate window per high tide.
///
/// Pure over its inputs: no I/O beyond the resolver, no mutation of the
/// input slices, deterministic output order (input order of the extrema).
pub fn build_candidate_windows(
    extrema: &[TideExtreme],
    samples: &[WeatherSample],
    daylight: &impl DaylightResolver,
) -> Vec<CandidateWindow> {
    let mut daylight_by_date: HashMap<NaiveDate, DaylightInterval> = HashMap::new();
    let mut windows = Vec::new();

    for tide in extrema.iter().filter(|t| t.kind == TideKind::High) {
        let date = tide.timestamp.date_naive();
        let interval = *daylight_by_date
            .entry(date)
            .or_insert_with(|| daylight.daylight_for(date));

        let raw_start = tide.timestamp - Duration::minutes(WINDOW_HALF_WIDTH_MIN);
        let raw_end = tide.timestamp + Duration::minutes(WINDOW_HALF_WIDTH_MIN);

        let window_start = raw_start.max(interval.sunrise);
        let window_end = raw_end.min(interval.sunset);
        if window_start >= window_end {
            // No overlap with daylight; skip the tide, don't fail.
            continue;
        }

        let Some(sample) = nearest_sample(samples, tide.timestamp) else {
            // Weather feed had no samples at all.
            continue;
        };

        let is_sunny =
            matches!(sample.weather_code, 0 | 1) && sample.cloud_cover_pct < SUNNY_MAX_CLOUD_PCT;
        let is_clear =
            matches!(sample.weather_code, 0..=3) && sample.cloud_cover_pct < CLEAR_MAX_CLOUD_PCT;
        let is_dry = sample.rain_probability_pct < DRY_MAX_RAIN_PCT;

        let mut weather_desc = if is_sunny {
            WeatherDesc::Sunny
        } else if is_clear {
            WeatherDesc::Clear
        } else {
            WeatherDesc::Cloudy
        };
        // The override outranks the flags: a bright hour with a wet
        // forecast still reads Rainy, while is_sunny stays true.
        if sample.rain_probability_pct > RAINY_OVERRIDE_PCT {
            weather_desc = WeatherDesc::Rainy;
        }

        windows.push(CandidateWindow {
            tide_time: tide.timestamp,
            tide_height_m: tide.height_m,
            window_start,
            window_end,
            sunrise: interval.sunrise,
            sunset: interval.sunset,
            is_sunny,
            is_clear,
            is_dry,
            weather_desc,
            temperature_c: sample.temperature_c,
            rain_probability_pct: sample.rain_probability_pct,
            cloud_cover_pct: sample.cloud_cover_pct,
        });
    }

    windows
}

/// Weather sample with minimum absolute time distance to `at`.
///
/// Linear scan; at most a week of hourly samples, so nothing fancier is
/// warranted. `min_by_key` keeps the first of equally-distant samples.
fn nearest_sample(samples: &[WeatherSample], at: DateTime<Utc>) -> Option<&WeatherSample> {
    samples
        .iter()
        .min_by_key(|s| (s.timestamp - at).num_seconds().abs())
}

/// Score a window. Must stay exactly in step with the module doc: any
/// downstream consumer comparing rankings depends on these terms.
pub fn score(window: &CandidateWindow) -> f64 {
    let mut score = 0.0;
    if window.is_sunny {
        score += 100.0;
    }
    if window.is_clear {
        score += 50.0;
    }
    if window.is_dry {
        score += 30.0;
    }
    score -= window.rain_probability_pct as f64;
    score -= window.cloud_cover_pct as f64 / 2.0;
    score += window.duration_minutes() as f64 / 10.0;
    score
}

/// Sort windows best-first. The sort is stable, so windows with equal
/// scores keep their relative input order.
pub fn rank_windows(mut windows: Vec<CandidateWindow>) -> Vec<CandidateWindow> {
    windows.sort_by(|a, b| {
        score(b)
            .partial_cmp(&score(a))
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    windows
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::cell::Cell;

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, h, m, 0).unwrap()
    }

    fn high_tide(timestamp: DateTime<Utc>) -> TideExtreme {
        TideExtreme {
            timestamp,
            kind: TideKind::High,
            height_m: 3.8,
        }
    }

    fn sample(timestamp: DateTime<Utc>, code: u16, cloud: u8, rain: u8) -> WeatherSample {
        WeatherSample {
            timestamp,
            temperature_c: 15.0,
            rain_probability_pct: rain,
            weather_code: code,
            cloud_cover_pct: cloud,
        }
    }

    /// Fixed daylight 05:30-21:30 on the queried date
    fn summer_daylight(date: NaiveDate) -> DaylightInterval {
        DaylightInterval {
            date,
            sunrise: date.and_hms_opt(5, 30, 0).unwrap().and_utc(),
            sunset: date.and_hms_opt(21, 30, 0).unwrap().and_utc(),
        }
    }

    #[test]
    fn low_tides_are_ignored() {
        let extrema = vec![TideExtreme {
            timestamp: at(13, 0),
            kind: TideKind::Low,
            height_m: 0.4,
        }];
        let samples = vec![sample(at(13, 0), 1, 20, 5)];

        let windows = build_candidate_windows(&extrema, &samples, &summer_daylight);
        assert!(windows.is_empty(), "low water should never open a window");
    }

    #[test]
    fn unclipped_window_is_symmetric_around_tide() {
        let extrema = vec![high_tide(at(13, 0))];
        let samples = vec![sample(at(13, 0), 1, 20, 5)];

        let windows = build_candidate_windows(&extrema, &samples, &summer_daylight);
        assert_eq!(windows.len(), 1);

        let w = &windows[0];
        assert_eq!(w.tide_time - w.window_start, Duration::minutes(90));
        assert_eq!(w.window_end - w.tide_time, Duration::minutes(90));
        assert_eq!(w.duration_minutes(), 180);
    }

    #[test]
    fn window_is_clipped_to_sunrise() {
        // Raw window 05:00-08:00 against a 05:30 sunrise
        let extrema = vec![high_tide(at(6, 30))];
        let samples = vec![sample(at(6, 0), 1, 20, 5)];

        let windows = build_candidate_windows(&extrema, &samples, &summer_daylight);
        assert_eq!(windows.len(), 1);

        let w = &windows[0];
        assert_eq!(w.window_start, at(5, 30));
        assert_eq!(w.window_end, at(8, 0));
        assert_eq!(w.duration_minutes(), 150);
        assert!(w.sunrise <= w.window_start && w.window_end <= w.sunset);
    }

    #[test]
    fn tide_outside_daylight_is_discarded() {
        // High water 23:50 against an 18:00 sunset: no overlap, no window
        let extrema = vec![high_tide(at(23, 50))];
        let samples = vec![sample(at(23, 0), 0, 0, 0)];
        let daylight = |date: NaiveDate| DaylightInterval {
            date,
            sunrise: date.and_hms_opt(8, 0, 0).unwrap().and_utc(),
            sunset: date.and_hms_opt(18, 0, 0).unwrap().and_utc(),
        };

        let windows = build_candidate_windows(&extrema, &samples, &daylight);
        assert!(windows.is_empty());
    }

    #[test]
    fn window_touching_sunset_only_is_discarded() {
        // Raw window starts exactly at sunset: clipped range is empty
        let extrema = vec![high_tide(at(19, 30))];
        let samples = vec![sample(at(19, 0), 0, 0, 0)];
        let daylight = |date: NaiveDate| DaylightInterval {
            date,
            sunrise: date.and_hms_opt(8, 0, 0).unwrap().and_utc(),
            sunset: date.and_hms_opt(18, 0, 0).unwrap().and_utc(),
        };

        let windows = build_candidate_windows(&extrema, &samples, &daylight);
        assert!(windows.is_empty());
    }

    #[test]
    fn no_weather_samples_means_no_windows() {
        let extrema = vec![high_tide(at(13, 0))];
        let windows = build_candidate_windows(&extrema, &[], &summer_daylight);
        assert!(windows.is_empty());
    }

    #[test]
    fn nearest_sample_prefers_earliest_on_tie() {
        // 12:00 and 14:00 are equidistant from a 13:00 tide
        let samples = vec![
            sample(at(12, 0), 3, 90, 0),
            sample(at(14, 0), 0, 0, 0),
        ];

        let nearest = nearest_sample(&samples, at(13, 0)).unwrap();
        assert_eq!(nearest.timestamp, at(12, 0));
    }

    #[test]
    fn daylight_is_resolved_once_per_date() {
        let calls = Cell::new(0u32);
        let daylight = |date: NaiveDate| {
            calls.set(calls.get() + 1);
            summer_daylight(date)
        };

        // Two tides on the same date, one on the next
        let extrema = vec![
            high_tide(at(6, 30)),
            high_tide(at(19, 0)),
            high_tide(Utc.with_ymd_and_hms(2024, 6, 16, 7, 15, 0).unwrap()),
        ];
        let samples = vec![sample(at(12, 0), 1, 20, 5)];

        build_candidate_windows(&extrema, &samples, &daylight);
        assert_eq!(calls.get(), 2, "one resolver call per distinct date");
    }

    #[test]
    fn classification_flags_and_description() {
        let extrema = vec![high_tide(at(13, 0))];

        // code 1, cloud 20, rain 5 -> sunny, clear, dry
        let windows =
            build_candidate_windows(&extrema, &[sample(at(13, 0), 1, 20, 5)], &summer_daylight);
        let w = &windows[0];
        assert!(w.is_sunny && w.is_clear && w.is_dry);
        assert_eq!(w.weather_desc, WeatherDesc::Sunny);

        // code 3, cloud 50 -> clear but not sunny
        let windows =
            build_candidate_windows(&extrema, &[sample(at(13, 0), 3, 50, 5)], &summer_daylight);
        let w = &windows[0];
        assert!(!w.is_sunny && w.is_clear);
        assert_eq!(w.weather_desc, WeatherDesc::Clear);

        // code 61 (rain), cloud 95, rain 40 -> cloudy, not dry
        let windows =
            build_candidate_windows(&extrema, &[sample(at(13, 0), 61, 95, 40)], &summer_daylight);
        let w = &windows[0];
        assert!(!w.is_sunny && !w.is_clear && !w.is_dry);
        assert_eq!(w.weather_desc, WeatherDesc::Cloudy);
    }

    #[test]
    fn rainy_override_beats_a_sunny_sky() {
        // code 0 and thin cloud, but 60% rain probability: flags say
        // sunny, description says Rainy
        let extrema = vec![high_tide(at(13, 0))];
        let windows =
            build_candidate_windows(&extrema, &[sample(at(13, 0), 0, 10, 60)], &summer_daylight);

        let w = &windows[0];
        assert!(w.is_sunny);
        assert_eq!(w.weather_desc, WeatherDesc::Rainy);
    }

    #[test]
    fn score_matches_expected_terms() {
        let extrema = vec![high_tide(at(13, 0))];
        let windows =
            build_candidate_windows(&extrema, &[sample(at(13, 0), 1, 20, 5)], &summer_daylight);
        let w = &windows[0];

        // 100 (sunny) + 50 (clear) + 30 (dry) - 5 (rain) - 10 (cloud/2)
        // + 18 (180 min / 10)
        assert!((score(w) - 183.0).abs() < 1e-9);
    }

    #[test]
    fn ranking_is_descending_and_stable() {
        let extrema = vec![
            high_tide(at(7, 0)),
            high_tide(at(13, 0)),
            high_tide(Utc.with_ymd_and_hms(2024, 6, 16, 13, 0, 0).unwrap()),
        ];
        // One sample per tide hour: the 07:00 tide gets a grim sample, the
        // two 13:00 tides get identical good ones
        let samples = vec![
            sample(at(7, 0), 61, 100, 80),
            sample(at(13, 0), 1, 20, 5),
            sample(Utc.with_ymd_and_hms(2024, 6, 16, 13, 0, 0).unwrap(), 1, 20, 5),
        ];

        let ranked = rank_windows(build_candidate_windows(&extrema, &samples, &summer_daylight));
        assert_eq!(ranked.len(), 3);

        // Best two are the identically-scored 13:00 windows, in input
        // order (June 15 before June 16); the rainy dawn window is last
        assert_eq!(ranked[0].tide_time, at(13, 0));
        assert_eq!(
            ranked[1].tide_time,
            Utc.with_ymd_and_hms(2024, 6, 16, 13, 0, 0).unwrap()
        );
        assert_eq!(ranked[2].tide_time, at(7, 0));
        assert!(score(&ranked[0]) >= score(&ranked[2]));
    }
}

//! Ground-saturation heuristic.
//!
//! Classifies trail wetness from recent hourly rainfall. Recent rain
//! counts double: `weighted = 2 * last_24h_mm + 0.5 * total_mm`, banded
//! into five conditions from DRY to SATURATED. Missing hours count as no
//! rain.

use serde::{Deserialize, Serialize};

/// Trail wetness band derived from recent rainfall.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GroundCondition {
    Dry,
    SlightlyDamp,
    Wet,
    VeryWetBoggy,
    Saturated,
}

impl GroundCondition {
    /// One-line trail advice for the report.
    pub fn advice(&self) -> &'static str {
        match self {
            GroundCondition::Dry => "Perfect for hiking! Trails should be in great condition.",
            GroundCondition::SlightlyDamp => "Good for hiking. Some low spots might be muddy.",
            GroundCondition::Wet => "Trails will be muddy. Waterproof boots recommended.",
            GroundCondition::VeryWetBoggy => {
                "Very muddy and boggy. Expect wet feet without good waterproof gear."
            }
            GroundCondition::Saturated => {
                "Extremely boggy, trails may be partially flooded. Not ideal for hiking."
            }
        }
    }
}

impl std::fmt::Display for GroundCondition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            GroundCondition::Dry => "DRY",
            GroundCondition::SlightlyDamp => "SLIGHTLY DAMP",
            GroundCondition::Wet => "WET",
            GroundCondition::VeryWetBoggy => "VERY WET / BOGGY",
            GroundCondition::Saturated => "SATURATED",
        };
        write!(f, "{}", s)
    }
}

/// Rainfall totals and the derived condition for one assessment.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SaturationReport {
    /// Total rainfall over the whole series, mm
    pub total_mm: f64,
    /// Rainfall over the last 24 samples (or all, if fewer), mm
    pub last_24h_mm: f64,
    /// Per-day totals, oldest day first, mm
    pub daily_totals: Vec<f64>,
    /// `2 * last_24h_mm + 0.5 * total_mm`
    pub weighted: f64,
    /// Band the weighted score falls in
    pub condition: GroundCondition,
}

impl SaturationReport {
    /// Mean rainfall per analyzed day, mm.
    pub fn average_daily_mm(&self) -> f64 {
        if self.daily_totals.is_empty() {
            0.0
        } else {
            self.total_mm / self.daily_totals.len() as f64
        }
    }
}

/// Assess ground saturation from an hourly rainfall series (24 samples per
/// day, oldest first). `None` entries are hours the archive had no value
/// for and count as 0.
pub fn assess(hourly_mm: &[Option<f64>]) -> SaturationReport {
    let total_mm: f64 = hourly_mm.iter().flatten().sum();

    let tail_start = hourly_mm.len().saturating_sub(24);
    let last_24h_mm: f64 = hourly_mm[tail_start..].iter().flatten().sum();

    let daily_totals: Vec<f64> = hourly_mm
        .chunks(24)
        .map(|day| day.iter().flatten().sum())
        .collect();

    let weighted = 2.0 * last_24h_mm + 0.5 * total_mm;
    let condition = if weighted < 10.0 {
        GroundCondition::Dry
    } else if weighted < 25.0 {
        GroundCondition::SlightlyDamp
    } else if weighted < 50.0 {
        GroundCondition::Wet
    } else if weighted < 80.0 {
        GroundCondition::VeryWetBoggy
    } else {
        GroundCondition::Saturated
    };

    SaturationReport {
        total_mm,
        last_24h_mm,
        daily_totals,
        weighted,
        condition,
    }
}

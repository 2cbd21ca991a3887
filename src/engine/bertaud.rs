//! Bertaud model extensions: zoning gap analysis, zone-aware density bands,
//! polycentric density and parameter calibration.

use super::far::{OVER_THRESHOLD, UNDER_THRESHOLD};
use crate::model::{DensityBand, GapAnalysis, PolicyRecommendation, ZoneColor};

pub use crate::model::CenterInfluence;

/// Gap above which zoning is considered to choke market demand.
const UPGRADE_GAP: f64 = 1.0;
/// Headroom above which zoning is considered to exceed demand.
const OVER_SUPPLY_GAP: f64 = 2.0;
/// Width of each warning band around the optimal range.
const WARNING_WIDTH: f64 = 0.1;

/// Compares the market-supported FAR with the legal ceiling.
#[must_use]
pub fn gap_analysis(theoretical_far: f64, legal_max_far: f64) -> GapAnalysis {
    let far_gap = theoretical_far - legal_max_far;
    let is_constrained = far_gap > 0.0;

    let recommendation = if is_constrained && far_gap > UPGRADE_GAP {
        PolicyRecommendation::ZoningUpgrade
    } else if !is_constrained && -far_gap > OVER_SUPPLY_GAP {
        PolicyRecommendation::ZoneOverSupply
    } else {
        PolicyRecommendation::None
    };

    GapAnalysis {
        legal_max_far,
        theoretical_far,
        far_gap,
        is_constrained,
        recommendation,
    }
}

/// Five-tier band for an efficiency score.
///
/// Low-density residential (yellow) zones tighten the upper limit from 1.2
/// to 1.1.
#[must_use]
pub fn density_band(efficiency: f64, zone: Option<ZoneColor>) -> DensityBand {
    let upper = match zone {
        Some(ZoneColor::Yellow) => OVER_THRESHOLD - WARNING_WIDTH,
        _ => OVER_THRESHOLD,
    };
    let lower = UNDER_THRESHOLD;

    if efficiency < lower - WARNING_WIDTH {
        DensityBand::UnderUtilization
    } else if efficiency < lower {
        DensityBand::LowDensityWarning
    } else if efficiency <= upper - WARNING_WIDTH {
        DensityBand::Optimal
    } else if efficiency <= upper {
        DensityBand::HighDensityWarning
    } else {
        DensityBand::OverDensification
    }
}

/// Advisory for gradients outside the range seen in real monocentric cities.
#[must_use]
pub fn gradient_warning(g: f64) -> Option<String> {
    if g > 0.5 {
        Some(format!(
            "gradient g={g} is unusually high; density decays extremely fast"
        ))
    } else if g < 0.01 {
        Some(format!(
            "gradient g={g} is unusually low; density is almost uniform"
        ))
    } else {
        None
    }
}

/// Sum of each centre's exponential density at the location.
#[must_use]
pub fn polycentric_density(centers: &[CenterInfluence]) -> f64 {
    centers
        .iter()
        .map(|c| super::far::theoretical_far(c.d0, c.g, c.distance_km))
        .sum()
}

/// Estimates `(D₀, g)` from `(distance_km, density)` observations.
///
/// Fits `ln D = ln D₀ − g·x` by least squares. Samples with non-positive
/// density are ignored; returns `None` with fewer than two usable samples or
/// when every sample sits at the same distance.
#[must_use]
pub fn calibrate(samples: &[(f64, f64)]) -> Option<(f64, f64)> {
    let points: Vec<(f64, f64)> = samples
        .iter()
        .filter(|(_, density)| *density > 0.0)
        .map(|&(x, density)| (x, density.ln()))
        .collect();

    if points.len() < 2 {
        return None;
    }

    let n = points.len() as f64;
    let x_mean = points.iter().map(|(x, _)| x).sum::<f64>() / n;
    let y_mean = points.iter().map(|(_, y)| y).sum::<f64>() / n;

    let numerator: f64 = points
        .iter()
        .map(|(x, y)| (x - x_mean) * (y - y_mean))
        .sum();
    let denominator: f64 = points.iter().map(|(x, _)| (x - x_mean).powi(2)).sum();

    if denominator == 0.0 {
        return None;
    }

    let slope = numerator / denominator;
    let intercept = y_mean - slope * x_mean;
    Some((intercept.exp(), -slope))
}

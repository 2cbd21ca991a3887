//! FAR evaluation against the Bertaud monocentric-city model.
//!
//! `D(x) = D₀ · e^(−g·x)` gives the floor area ratio the market would
//! support at distance `x` km from the CBD. The proposal's own FAR is
//! compared with it to produce an efficiency score.

use super::units::rai_to_sqm;
use crate::error::FarError;
use crate::model::{FarEvaluation, FarInputs, FarResponse, FarStatus, DEFAULT_LEGAL_MAX_FAR};

/// Efficiency below this is under-utilization.
pub const UNDER_THRESHOLD: f64 = 0.8;
/// Efficiency above this is over-densification.
pub const OVER_THRESHOLD: f64 = 1.2;

/// Evaluates proposed, theoretical and legal FAR for one input tuple.
///
/// # Errors
///
/// * [`FarError::ZeroLandSize`] if land size is not strictly positive.
/// * [`FarError::ZeroGfa`] if the proposed floor area is negative. Zero is
///   accepted.
/// * [`FarError::InvalidParams`] if `d0 <= 0`, `g < 0` or `distance_km < 0`.
///
/// `NaN` in any of these fields fails the corresponding guard.
///
/// # Example
///
/// ```
/// use land_audit::engine::far::calculate_far;
/// use land_audit::model::{FarInputs, FarStatus};
///
/// let result = calculate_far(&FarInputs::new(5.0, 40_000.0, 10.0, 0.1, 2.0))?;
/// assert_eq!(result.proposed_far, 5.0);
/// assert_eq!(result.theoretical_far, 8.19);
/// assert_eq!(result.status, FarStatus::Under);
/// # Ok::<(), land_audit::error::FarError>(())
/// ```
pub fn calculate_far(inputs: &FarInputs) -> Result<FarEvaluation, FarError> {
    if inputs.land_size_rai.is_nan() || inputs.land_size_rai <= 0.0 {
        return Err(FarError::ZeroLandSize);
    }
    if inputs.proposed_gfa.is_nan() || inputs.proposed_gfa < 0.0 {
        return Err(FarError::ZeroGfa);
    }
    let params = [inputs.d0, inputs.g, inputs.distance_km];
    if params.iter().any(|v| v.is_nan())
        || inputs.d0 <= 0.0
        || inputs.g < 0.0
        || inputs.distance_km < 0.0
    {
        return Err(FarError::InvalidParams);
    }

    let land_size_sqm = rai_to_sqm(inputs.land_size_rai);
    let proposed_far = inputs.proposed_gfa / land_size_sqm;
    let theoretical = theoretical_far(inputs.d0, inputs.g, inputs.distance_km);
    let efficiency_score = efficiency(proposed_far, theoretical);
    let legal_max_far = inputs.legal_max_far.unwrap_or(DEFAULT_LEGAL_MAX_FAR);

    Ok(FarEvaluation {
        proposed_far: round2(proposed_far),
        theoretical_far: round2(theoretical),
        legal_max_far: round2(legal_max_far),
        efficiency_score: round2(efficiency_score),
        status: far_status(efficiency_score),
        land_size_sqm: round2(land_size_sqm),
    })
}

/// Never-failing wrapper producing the JSON success or error shape.
#[must_use]
pub fn calculate_far_response(inputs: &FarInputs) -> FarResponse {
    match calculate_far(inputs) {
        Ok(evaluation) => FarResponse::Ok(evaluation),
        Err(error) => FarResponse::Err(error.into()),
    }
}

/// `D₀ · e^(−g·x)`.
#[must_use]
pub fn theoretical_far(d0: f64, g: f64, distance_km: f64) -> f64 {
    d0 * (-g * distance_km).exp()
}

/// Proposed over theoretical, or 0 when the theoretical FAR vanishes.
#[must_use]
pub fn efficiency(proposed_far: f64, theoretical_far: f64) -> f64 {
    if theoretical_far > 0.0 {
        proposed_far / theoretical_far
    } else {
        0.0
    }
}

/// Buckets an efficiency score. Both thresholds are inclusive of OPTIMAL.
#[must_use]
pub fn far_status(efficiency_score: f64) -> FarStatus {
    if efficiency_score < UNDER_THRESHOLD {
        FarStatus::Under
    } else if efficiency_score > OVER_THRESHOLD {
        FarStatus::Over
    } else {
        FarStatus::Optimal
    }
}

#[must_use]
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn inputs(land: f64, gfa: f64) -> FarInputs {
        FarInputs::new(land, gfa, 10.0, 0.1, 2.0)
    }

    #[test]
    fn reference_case() {
        let result = calculate_far(&inputs(5.0, 40_000.0)).unwrap();
        assert_eq!(
            result,
            FarEvaluation {
                proposed_far: 5.0,
                theoretical_far: 8.19,
                legal_max_far: 10.0,
                efficiency_score: 0.61,
                status: FarStatus::Under,
                land_size_sqm: 8000.0,
            }
        );
    }

    #[rstest]
    #[case(0.0, 1000.0, FarError::ZeroLandSize)]
    #[case(-1.0, 1000.0, FarError::ZeroLandSize)]
    #[case(f64::NAN, 1000.0, FarError::ZeroLandSize)]
    #[case(5.0, -1.0, FarError::ZeroGfa)]
    #[case(5.0, f64::NAN, FarError::ZeroGfa)]
    fn rejects_bad_areas(#[case] land: f64, #[case] gfa: f64, #[case] expected: FarError) {
        assert_eq!(calculate_far(&inputs(land, gfa)), Err(expected));
    }

    #[rstest]
    #[case(0.0, 0.1, 2.0)]
    #[case(-3.0, 0.1, 2.0)]
    #[case(10.0, -0.1, 2.0)]
    #[case(10.0, 0.1, -2.0)]
    fn rejects_bad_model_parameters(#[case] d0: f64, #[case] g: f64, #[case] x: f64) {
        let result = calculate_far(&FarInputs::new(5.0, 1000.0, d0, g, x));
        assert_eq!(result, Err(FarError::InvalidParams));
    }

    #[test]
    fn land_guard_wins_over_other_guards() {
        let result = calculate_far(&FarInputs::new(0.0, -5.0, -1.0, -1.0, -1.0));
        assert_eq!(result, Err(FarError::ZeroLandSize));
    }

    #[test]
    fn zero_floor_area_is_accepted() {
        let result = calculate_far(&inputs(5.0, 0.0)).unwrap();
        assert_eq!(result.proposed_far, 0.0);
        assert_eq!(result.status, FarStatus::Under);
    }

    #[test]
    fn legal_max_is_passed_through() {
        let result = calculate_far(&inputs(5.0, 40_000.0).with_legal_max(7.456)).unwrap();
        assert_eq!(result.legal_max_far, 7.46);
    }

    #[rstest]
    #[case(0.79, FarStatus::Under)]
    #[case(0.8, FarStatus::Optimal)]
    #[case(1.0, FarStatus::Optimal)]
    #[case(1.2, FarStatus::Optimal)]
    #[case(1.2000001, FarStatus::Over)]
    fn status_boundaries(#[case] score: f64, #[case] expected: FarStatus) {
        assert_eq!(far_status(score), expected);
    }

    #[test]
    fn theoretical_far_is_monotone_in_distance_and_gradient() {
        let mut previous = f64::INFINITY;
        for step in 0..50 {
            let x = f64::from(step) * 0.5;
            let value = theoretical_far(10.0, 0.12, x);
            assert!(value <= previous);
            previous = value;
        }

        let mut previous = f64::INFINITY;
        for step in 0..50 {
            let g = f64::from(step) * 0.02;
            let value = theoretical_far(10.0, g, 3.0);
            assert!(value <= previous);
            previous = value;
        }
    }

    #[test]
    fn efficiency_guards_zero_theoretical() {
        assert_eq!(efficiency(3.0, 0.0), 0.0);
    }

    #[test]
    fn response_serializes_error_shape() {
        let response = calculate_far_response(&inputs(0.0, 1000.0));
        let json = serde_json::to_value(response).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "error": true,
                "code": "ZERO_LAND_SIZE",
                "message": "Land size must be greater than 0"
            })
        );
    }

    #[test]
    fn response_serializes_success_shape() {
        let response = calculate_far_response(&inputs(5.0, 40_000.0));
        let json = serde_json::to_value(response).unwrap();
        assert_eq!(json["status"], "UNDER");
        assert_eq!(json["proposedFar"], 5.0);
        assert_eq!(json["landSizeSqm"], 8000.0);
    }
}

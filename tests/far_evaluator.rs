use land_audit::engine::far::{calculate_far, calculate_far_response, far_status, theoretical_far};
use land_audit::error::FarError;
use land_audit::model::{FarInputs, FarStatus};
use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::json;

#[test]
fn reference_parcel_is_under_used() {
    let evaluation = calculate_far(&FarInputs::new(5.0, 40_000.0, 10.0, 0.1, 2.0)).unwrap();

    assert_eq!(evaluation.proposed_far, 5.0);
    assert_eq!(evaluation.theoretical_far, 8.19);
    assert_eq!(evaluation.efficiency_score, 0.61);
    assert_eq!(evaluation.legal_max_far, 10.0);
    assert_eq!(evaluation.land_size_sqm, 8000.0);
    assert_eq!(evaluation.status, FarStatus::Under);
}

#[test]
fn theoretical_far_never_rises_with_distance_or_gradient() {
    let mut previous = f64::INFINITY;
    for step in 0..=40 {
        let distance = f64::from(step) * 0.5;
        let far = theoretical_far(10.0, 0.1, distance);
        assert!(far <= previous, "distance {distance} raised FAR");
        previous = far;
    }

    let mut previous = f64::INFINITY;
    for step in 0..=40 {
        let g = f64::from(step) * 0.025;
        let far = theoretical_far(10.0, g, 3.0);
        assert!(far <= previous, "gradient {g} raised FAR");
        previous = far;
    }
}

#[rstest]
#[case(0.0, 40_000.0, FarError::ZeroLandSize)]
#[case(-2.0, 40_000.0, FarError::ZeroLandSize)]
#[case(5.0, -1.0, FarError::ZeroGfa)]
fn rejects_bad_parcels(#[case] land: f64, #[case] gfa: f64, #[case] expected: FarError) {
    let err = calculate_far(&FarInputs::new(land, gfa, 10.0, 0.1, 2.0)).unwrap_err();
    assert_eq!(err, expected);
}

#[rstest]
#[case(0.0, 0.1, 2.0)]
#[case(10.0, -0.1, 2.0)]
#[case(10.0, 0.1, -1.0)]
fn rejects_bad_model_parameters(#[case] d0: f64, #[case] g: f64, #[case] distance: f64) {
    let err = calculate_far(&FarInputs::new(5.0, 40_000.0, d0, g, distance)).unwrap_err();
    assert_eq!(err.code(), "INVALID_PARAMS");
}

#[test]
fn zero_gfa_is_a_valid_empty_proposal() {
    let evaluation = calculate_far(&FarInputs::new(5.0, 0.0, 10.0, 0.1, 2.0)).unwrap();
    assert_eq!(evaluation.proposed_far, 0.0);
    assert_eq!(evaluation.status, FarStatus::Under);
}

// With g = 0 the theoretical FAR is D0, so one rai at D0 = 10 puts the
// efficiency exactly on the thresholds.
#[rstest]
#[case(12_799.0, FarStatus::Under)]
#[case(12_800.0, FarStatus::Optimal)]
#[case(19_200.0, FarStatus::Optimal)]
#[case(19_201.0, FarStatus::Over)]
fn thresholds_are_optimal(#[case] gfa: f64, #[case] expected: FarStatus) {
    let evaluation = calculate_far(&FarInputs::new(1.0, gfa, 10.0, 0.0, 5.0)).unwrap();
    assert_eq!(evaluation.status, expected);
}

#[test]
fn status_buckets_match_score() {
    assert_eq!(far_status(0.7999), FarStatus::Under);
    assert_eq!(far_status(0.8), FarStatus::Optimal);
    assert_eq!(far_status(1.2), FarStatus::Optimal);
    assert_eq!(far_status(1.2001), FarStatus::Over);
}

#[test]
fn explicit_legal_max_is_reported() {
    let inputs = FarInputs::new(5.0, 40_000.0, 10.0, 0.1, 2.0).with_legal_max(7.0);
    assert_eq!(calculate_far(&inputs).unwrap().legal_max_far, 7.0);
}

#[test]
fn reads_camel_case_request() {
    let inputs: FarInputs = serde_json::from_value(json!({
        "landSizeRai": 5,
        "proposedGFA": 40000,
        "d0": 10,
        "g": 0.1,
        "distanceKm": 2,
        "legalMaxFAR": 8
    }))
    .unwrap();

    assert_eq!(inputs, FarInputs::new(5.0, 40_000.0, 10.0, 0.1, 2.0).with_legal_max(8.0));
}

#[test]
fn success_response_shape() {
    let response = calculate_far_response(&FarInputs::new(5.0, 40_000.0, 10.0, 0.1, 2.0));
    let value = serde_json::to_value(response).unwrap();

    assert_eq!(
        value,
        json!({
            "proposedFar": 5.0,
            "theoreticalFar": 8.19,
            "legalMaxFar": 10.0,
            "efficiencyScore": 0.61,
            "status": "UNDER",
            "landSizeSqm": 8000.0
        })
    );
}

#[test]
fn error_response_shape() {
    let response = calculate_far_response(&FarInputs::new(0.0, 40_000.0, 10.0, 0.1, 2.0));
    let value = serde_json::to_value(response).unwrap();

    assert_eq!(
        value,
        json!({
            "error": true,
            "code": "ZERO_LAND_SIZE",
            "message": "Land size must be greater than 0"
        })
    );
}

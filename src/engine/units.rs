//! Thai land units and great-circle distance.

use crate::model::GeoPoint;

pub const SQM_PER_RAI: f64 = 1600.0;
pub const SQM_PER_NGAN: f64 = 400.0;
pub const SQM_PER_SQUARE_WAH: f64 = 4.0;

const EARTH_RADIUS_KM: f64 = 6371.0;

#[must_use]
pub fn rai_to_sqm(rai: f64) -> f64 {
    rai * SQM_PER_RAI
}

#[must_use]
pub fn square_wah_to_sqm(wah: f64) -> f64 {
    wah * SQM_PER_SQUARE_WAH
}

/// Converts a title-deed area written as rai-ngan-wah into rai.
#[must_use]
pub fn rai_ngan_wah_to_rai(rai: f64, ngan: f64, wah: f64) -> f64 {
    (rai_to_sqm(rai) + ngan * SQM_PER_NGAN + square_wah_to_sqm(wah)) / SQM_PER_RAI
}

/// Parses a title-deed area such as `2-1-50` (rai-ngan-wah) into rai.
///
/// Missing trailing parts count as zero, so `5` and `5-2` are accepted.
/// Negative or non-numeric parts are rejected.
#[must_use]
pub fn parse_title_deed_area(text: &str) -> Option<f64> {
    let mut parts = [0.0; 3];
    if text.split('-').count() > parts.len() {
        return None;
    }
    for (slot, part) in parts.iter_mut().zip(text.split('-')) {
        let value: f64 = part.trim().parse().ok()?;
        if !value.is_finite() || value < 0.0 {
            return None;
        }
        *slot = value;
    }
    let [rai, ngan, wah] = parts;
    Some(rai_ngan_wah_to_rai(rai, ngan, wah))
}

/// Haversine distance between two points in kilometres.
#[must_use]
pub fn haversine_km(a: GeoPoint, b: GeoPoint) -> f64 {
    let (lat1, lat2) = (a.lat.to_radians(), b.lat.to_radians());
    let dlat = lat2 - lat1;
    let dlon = (b.lon - a.lon).to_radians();

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().asin()
}

use serde::{Deserialize, Serialize};

/// Legal FAR ceiling assumed when the caller supplies none.
pub const DEFAULT_LEGAL_MAX_FAR: f64 = 10.0;

/// The proposal under audit, as entered by the analyst.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProjectInputs {
    pub project_name: String,
    pub land_size_rai: f64,
    /// Gross floor area in m².
    #[serde(alias = "proposedGFA")]
    pub proposed_gfa: f64,
    pub building_height_m: f64,
    pub cost_per_sqm: f64,
    pub upfront_fee: f64,
    pub annual_rent: f64,
}

impl Default for ProjectInputs {
    fn default() -> Self {
        Self {
            project_name: "Untitled project".to_string(),
            land_size_rai: 5.0,
            proposed_gfa: 40_000.0,
            building_height_m: 45.0,
            cost_per_sqm: 30_000.0,
            upfront_fee: 50_000_000.0,
            annual_rent: 10_000_000.0,
        }
    }
}

impl ProjectInputs {
    /// Total construction investment (cost per m² × GFA).
    #[must_use]
    pub fn investment(&self) -> f64 {
        self.cost_per_sqm * self.proposed_gfa
    }
}

/// Exogenous parameters of the monocentric density model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BertaudParameters {
    /// Central density D₀, the FAR at the CBD.
    pub d0: f64,
    /// Density gradient g.
    pub g: f64,
    /// Distance x from the CBD in km.
    pub distance_km: f64,
    #[serde(alias = "legalMaxFAR")]
    pub legal_max_far: Option<f64>,
}

impl Default for BertaudParameters {
    fn default() -> Self {
        Self {
            d0: 10.0,
            g: 0.1,
            distance_km: 2.0,
            legal_max_far: None,
        }
    }
}

/// Planning zone colours that change the density band limits.
///
/// Written out in lowercase; read back through [`ZoneColor::parse`], so
/// "Red" and "Yellow zone" load too.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum ZoneColor {
    /// Low density residential.
    Yellow,
    /// Medium density residential.
    Orange,
    /// High density residential.
    Brown,
    /// Commercial.
    Red,
    /// Industrial.
    Purple,
    /// Government and institutional.
    Blue,
    /// Rural and agricultural conservation.
    Green,
}

impl ZoneColor {
    /// Parses a colour name, ignoring case and surrounding words
    /// ("Yellow zone" is yellow).
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        let lower = s.to_lowercase();
        [
            ("yellow", Self::Yellow),
            ("orange", Self::Orange),
            ("brown", Self::Brown),
            ("red", Self::Red),
            ("purple", Self::Purple),
            ("blue", Self::Blue),
            ("green", Self::Green),
        ]
        .into_iter()
        .find(|(name, _)| lower.contains(name))
        .map(|(_, zone)| zone)
    }
}

impl TryFrom<String> for ZoneColor {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value).ok_or_else(|| format!("unknown zone colour `{value}`"))
    }
}

/// WGS84 coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

/// One employment centre's pull on a location.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CenterInfluence {
    pub d0: f64,
    pub g: f64,
    pub distance_km: f64,
}

/// Observed density at a distance from the CBD, used to calibrate D₀ and g.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DensitySample {
    pub distance_km: f64,
    pub density: f64,
}

/// Optional location context around the parcel.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SiteContext {
    pub province: Option<String>,
    pub zone: Option<ZoneColor>,
    pub location: Option<GeoPoint>,
    pub cbd: Option<GeoPoint>,
    /// Secondary centres besides the CBD.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sub_centers: Vec<CenterInfluence>,
}

/// The exact input tuple of the FAR evaluator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FarInputs {
    pub land_size_rai: f64,
    #[serde(rename = "proposedGFA", alias = "proposedGfa")]
    pub proposed_gfa: f64,
    pub d0: f64,
    pub g: f64,
    pub distance_km: f64,
    #[serde(
        default,
        rename = "legalMaxFAR",
        alias = "legalMaxFar",
        skip_serializing_if = "Option::is_none"
    )]
    pub legal_max_far: Option<f64>,
}

impl FarInputs {
    #[must_use]
    pub fn new(land_size_rai: f64, proposed_gfa: f64, d0: f64, g: f64, distance_km: f64) -> Self {
        Self {
            land_size_rai,
            proposed_gfa,
            d0,
            g,
            distance_km,
            legal_max_far: None,
        }
    }

    #[must_use]
    pub fn with_legal_max(mut self, legal_max_far: f64) -> Self {
        self.legal_max_far = Some(legal_max_far);
        self
    }

    #[must_use]
    pub fn from_project(project: &ProjectInputs, params: &BertaudParameters) -> Self {
        Self {
            land_size_rai: project.land_size_rai,
            proposed_gfa: project.proposed_gfa,
            d0: params.d0,
            g: params.g,
            distance_km: params.distance_km,
            legal_max_far: params.legal_max_far,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zone_color_parses_loosely() {
        assert_eq!(ZoneColor::parse("Yellow zone"), Some(ZoneColor::Yellow));
        assert_eq!(ZoneColor::parse("RED"), Some(ZoneColor::Red));
        assert_eq!(ZoneColor::parse("grey"), None);
    }

    #[test]
    fn zone_color_deserializes_any_case() {
        let site: SiteContext = serde_json::from_str(r#"{"zone":"Orange"}"#).unwrap();
        assert_eq!(site.zone, Some(ZoneColor::Orange));
        assert_eq!(serde_json::to_string(&ZoneColor::Orange).unwrap(), r#""orange""#);

        let err = serde_json::from_str::<SiteContext>(r#"{"zone":"grey"}"#).unwrap_err();
        assert!(err.to_string().contains("unknown zone colour `grey`"));
    }

    #[test]
    fn far_inputs_accept_camel_case_json() {
        let json = r#"{"landSizeRai":5,"proposedGFA":40000,"d0":10,"g":0.1,"distanceKm":2}"#;
        let inputs: FarInputs = serde_json::from_str(json).unwrap();
        assert_eq!(inputs, FarInputs::new(5.0, 40_000.0, 10.0, 0.1, 2.0));
    }

    #[test]
    fn investment_is_cost_times_floor_area() {
        let project = ProjectInputs {
            cost_per_sqm: 20_000.0,
            proposed_gfa: 1_000.0,
            ..ProjectInputs::default()
        };
        assert!((project.investment() - 20_000_000.0).abs() < 1e-6);
    }
}

use crate::error::FarError;
use serde::Serialize;

/// Three-way classification of the efficiency score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FarStatus {
    Under,
    Optimal,
    Over,
}

impl FarStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Under => "UNDER",
            Self::Optimal => "OPTIMAL",
            Self::Over => "OVER",
        }
    }

    #[must_use]
    pub const fn thai_label(self) -> &'static str {
        match self {
            Self::Under => "ใช้ประโยชน์น้อยเกินไป (UNDER)",
            Self::Optimal => "เหมาะสม (OPTIMAL)",
            Self::Over => "หนาแน่นเกินไป (OVER)",
        }
    }
}

/// Result of the FAR evaluator. Magnitudes are rounded to 2 decimals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FarEvaluation {
    pub proposed_far: f64,
    pub theoretical_far: f64,
    pub legal_max_far: f64,
    pub efficiency_score: f64,
    pub status: FarStatus,
    pub land_size_sqm: f64,
}

/// JSON error shape: `{ "error": true, "code": ..., "message": ... }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FarErrorBody {
    pub error: bool,
    pub code: &'static str,
    pub message: String,
}

impl From<FarError> for FarErrorBody {
    fn from(error: FarError) -> Self {
        Self {
            error: true,
            code: error.code(),
            message: error.to_string(),
        }
    }
}

/// Either shape of the evaluator response, serialized without a tag.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FarResponse {
    Ok(FarEvaluation),
    Err(FarErrorBody),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CostStatus {
    Pass,
    Anomaly,
}

impl CostStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pass => "Pass",
            Self::Anomaly => "Anomaly",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RoaStatus {
    Low,
    Target,
}

impl RoaStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Target => "Target",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialEvaluation {
    /// Landowner NPV over the lease term, including upfront fee and residual.
    pub npv: f64,
    /// Height-dependent benchmark, adjusted by the regional factor.
    pub standard_cost: f64,
    pub regional_factor: f64,
    /// (actual − standard) / standard.
    pub cost_deviation: f64,
    pub cost_status: CostStatus,
    pub roa: f64,
    pub roa_status: RoaStatus,
    /// Years of first-year rent needed to recover the investment at the
    /// discount rate; `None` when the rent never covers it.
    pub breakeven_years: Option<f64>,
    pub sensitivity: Sensitivity,
}

/// NPV at the base discount rate and two points either side.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Sensitivity {
    pub base_rate: f64,
    pub base_npv: f64,
    pub plus_two_npv: f64,
    pub minus_two_npv: f64,
}

impl FinancialEvaluation {
    #[must_use]
    pub fn cost_deviation_percent(&self) -> f64 {
        self.cost_deviation * 100.0
    }

    #[must_use]
    pub fn roa_percent(&self) -> f64 {
        self.roa * 100.0
    }
}

/// Policy hint derived from the gap between market demand and zoning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PolicyRecommendation {
    None,
    ZoningUpgrade,
    ZoneOverSupply,
}

impl PolicyRecommendation {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "None",
            Self::ZoningUpgrade => "Request zoning upgrade",
            Self::ZoneOverSupply => "Zone over-supply (focus on infrastructure)",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GapAnalysis {
    pub legal_max_far: f64,
    pub theoretical_far: f64,
    /// Theoretical minus legal; positive when zoning caps market demand.
    pub far_gap: f64,
    pub is_constrained: bool,
    pub recommendation: PolicyRecommendation,
}

/// Five-tier, zone-aware reading of the efficiency score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DensityBand {
    UnderUtilization,
    LowDensityWarning,
    Optimal,
    HighDensityWarning,
    OverDensification,
}

impl DensityBand {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::UnderUtilization => "Under-utilization",
            Self::LowDensityWarning => "Low density warning",
            Self::Optimal => "Optimal",
            Self::HighDensityWarning => "High density warning",
            Self::OverDensification => "Over-densification",
        }
    }
}

/// Everything derived from one input snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectEvaluation {
    pub far: FarEvaluation,
    pub financial: FinancialEvaluation,
    pub gap: GapAnalysis,
    pub density_band: DensityBand,
    /// Advisory about an unusual density gradient, if any.
    pub gradient_warning: Option<String>,
    /// Density from the CBD plus every sub-centre, when the site lists any.
    pub polycentric_far: Option<f64>,
}

impl ProjectEvaluation {
    /// Overall verdict used by the report and dashboard header.
    #[must_use]
    pub fn passes(&self) -> bool {
        self.far.status == FarStatus::Optimal
            && self.financial.cost_status == CostStatus::Pass
            && self.financial.roa_status == RoaStatus::Target
    }
}

//! Lease cash flow, construction-cost audit and return on assets.

use crate::model::{CostStatus, FinancialEvaluation, RoaStatus};
pub use crate::model::Sensitivity;
use serde::{Deserialize, Serialize};

/// Fixed parameters of the financial audit. The defaults are the treasury
/// lease terms the dashboard has always used.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FinancialAssumptions {
    pub lease_term_years: u32,
    pub discount_rate: f64,
    pub rent_escalation_rate: f64,
    pub escalation_interval_years: u32,
    /// Share of the construction investment left as residual value.
    pub residual_fraction: f64,
    pub roa_target: f64,
    /// Largest accepted |deviation| from the benchmark cost.
    pub cost_tolerance: f64,
    /// Buildings taller than this use the high-rise benchmark.
    pub high_rise_height_m: f64,
    pub low_rise_cost_per_sqm: f64,
    pub high_rise_cost_per_sqm: f64,
}

impl Default for FinancialAssumptions {
    fn default() -> Self {
        Self {
            lease_term_years: 30,
            discount_rate: 0.035,
            rent_escalation_rate: 0.15,
            escalation_interval_years: 5,
            residual_fraction: 0.20,
            roa_target: 0.03,
            cost_tolerance: 0.20,
            high_rise_height_m: 23.0,
            low_rise_cost_per_sqm: 15_000.0,
            high_rise_cost_per_sqm: 30_000.0,
        }
    }
}

/// The numbers the financial audit reads from a project.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FinancialInputs {
    pub upfront_fee: f64,
    pub annual_rent: f64,
    pub cost_per_sqm: f64,
    pub proposed_gfa: f64,
    pub building_height_m: f64,
    /// Regional construction cost index, 1.0 for Bangkok.
    pub regional_factor: f64,
}

impl Default for FinancialInputs {
    fn default() -> Self {
        Self {
            upfront_fee: 0.0,
            annual_rent: 0.0,
            cost_per_sqm: 0.0,
            proposed_gfa: 0.0,
            building_height_m: 0.0,
            regional_factor: 1.0,
        }
    }
}

impl FinancialInputs {
    /// Regional factor actually applied; non-positive or non-finite values
    /// count as Bangkok.
    #[must_use]
    pub fn effective_regional_factor(&self) -> f64 {
        if self.regional_factor.is_finite() && self.regional_factor > 0.0 {
            self.regional_factor
        } else {
            1.0
        }
    }

    #[must_use]
    pub fn investment(&self) -> f64 {
        self.cost_per_sqm * self.proposed_gfa
    }
}

/// Construction cost indices relative to Bangkok.
const REGIONAL_COST_FACTORS: &[(&str, f64)] = &[
    ("bangkok", 1.0),
    ("phuket", 1.15),
    ("chiang mai", 1.05),
    ("chonburi", 1.02),
    ("udon thani", 0.95),
];

/// Location factor for a province name; unknown provinces count as Bangkok.
#[must_use]
pub fn regional_cost_factor(province: Option<&str>) -> f64 {
    let Some(province) = province else {
        return 1.0;
    };
    let normalized = province.trim().to_lowercase();
    REGIONAL_COST_FACTORS
        .iter()
        .find(|(name, _)| *name == normalized)
        .map_or(1.0, |(_, factor)| *factor)
}

/// Runs the whole financial audit.
#[must_use]
pub fn evaluate_financials(
    inputs: &FinancialInputs,
    assumptions: &FinancialAssumptions,
) -> FinancialEvaluation {
    let npv = state_npv(inputs, assumptions);

    let regional_factor = inputs.effective_regional_factor();
    let standard_cost = standard_cost(inputs.building_height_m, assumptions) * regional_factor;
    let cost_deviation = cost_deviation(inputs.cost_per_sqm, standard_cost);
    let cost_status = if cost_deviation.abs() > assumptions.cost_tolerance {
        CostStatus::Anomaly
    } else {
        CostStatus::Pass
    };

    let roa = return_on_assets(npv, inputs.investment(), assumptions.lease_term_years);
    let roa_status = if roa < assumptions.roa_target {
        RoaStatus::Low
    } else {
        RoaStatus::Target
    };

    let breakeven_years = breakeven_lease_term(
        inputs.investment(),
        inputs.annual_rent,
        assumptions.discount_rate,
    );

    FinancialEvaluation {
        npv,
        standard_cost,
        regional_factor,
        cost_deviation,
        cost_status,
        roa,
        roa_status,
        breakeven_years,
        sensitivity: sensitivity(inputs, assumptions),
    }
}

/// Net present value of the lease to the landowner.
///
/// Starts from the upfront fee, adds each year's rent discounted to year 0
/// (escalated at the start of every interval after the first year), then
/// the residual share of the investment discounted from the final year.
#[must_use]
pub fn state_npv(inputs: &FinancialInputs, assumptions: &FinancialAssumptions) -> f64 {
    npv_at_rate(inputs, assumptions, assumptions.discount_rate)
}

fn npv_at_rate(inputs: &FinancialInputs, assumptions: &FinancialAssumptions, rate: f64) -> f64 {
    let interval = assumptions.escalation_interval_years.max(1);
    let mut npv = inputs.upfront_fee;
    let mut rent = inputs.annual_rent;

    for year in 1..=assumptions.lease_term_years {
        if year > 1 && (year - 1) % interval == 0 {
            rent *= 1.0 + assumptions.rent_escalation_rate;
        }
        npv += rent / discount_factor(rate, year);
    }

    let residual = assumptions.residual_fraction * inputs.investment();
    npv + residual / discount_factor(rate, assumptions.lease_term_years)
}

fn discount_factor(rate: f64, year: u32) -> f64 {
    (1.0 + rate).powi(i32::try_from(year).unwrap_or(i32::MAX))
}

/// Benchmark construction cost per m² for a building height.
#[must_use]
pub fn standard_cost(height_m: f64, assumptions: &FinancialAssumptions) -> f64 {
    if height_m > assumptions.high_rise_height_m {
        assumptions.high_rise_cost_per_sqm
    } else {
        assumptions.low_rise_cost_per_sqm
    }
}

/// `(actual − standard) / standard`, 0 for a non-positive standard.
#[must_use]
pub fn cost_deviation(actual: f64, standard: f64) -> f64 {
    if standard > 0.0 {
        (actual - standard) / standard
    } else {
        0.0
    }
}

/// Average annual NPV over the lease divided by the investment.
#[must_use]
pub fn return_on_assets(npv: f64, investment: f64, lease_term_years: u32) -> f64 {
    if investment > 0.0 && lease_term_years > 0 {
        (npv / f64::from(lease_term_years)) / investment
    } else {
        0.0
    }
}

/// Discounted payback period in years from the annuity formula
/// `n = −ln(1 − I·r / C) / ln(1 + r)`.
///
/// Returns `None` when the cash flow never recovers the investment.
#[must_use]
pub fn breakeven_lease_term(investment: f64, annual_cashflow: f64, discount_rate: f64) -> Option<f64> {
    if annual_cashflow <= 0.0 {
        return None;
    }
    if discount_rate <= 0.0 {
        return Some(investment / annual_cashflow);
    }
    let ratio = investment * discount_rate / annual_cashflow;
    if ratio >= 1.0 {
        return None;
    }
    Some(-(1.0 - ratio).ln() / (1.0 + discount_rate).ln())
}

/// NPV at the base discount rate and two points either side; the lower
/// rate is floored at zero.
#[must_use]
pub fn sensitivity(inputs: &FinancialInputs, assumptions: &FinancialAssumptions) -> Sensitivity {
    let base_rate = assumptions.discount_rate;
    Sensitivity {
        base_rate,
        base_npv: npv_at_rate(inputs, assumptions, base_rate),
        plus_two_npv: npv_at_rate(inputs, assumptions, base_rate + 0.02),
        minus_two_npv: npv_at_rate(inputs, assumptions, (base_rate - 0.02).max(0.0)),
    }
}

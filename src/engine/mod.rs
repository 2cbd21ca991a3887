pub mod bertaud;
pub mod far;
pub mod finance;
pub mod units;

pub use crate::error::FarError;
pub use far::{calculate_far, calculate_far_response, far_status, theoretical_far};
pub use finance::{evaluate_financials, FinancialAssumptions, FinancialInputs};

use crate::model::{
    BertaudParameters, CenterInfluence, FarInputs, ProjectEvaluation, ProjectInputs, SiteContext,
};

/// Evaluates one input snapshot end to end.
///
/// Callers invoke this after every input change; nothing is cached. The
/// density band and gap analysis read the unrounded model values so that
/// they agree with the FAR status.
///
/// # Errors
///
/// Returns the FAR evaluator's [`FarError`] when the inputs fail its guards.
/// The financial audit has no failure modes of its own.
pub fn evaluate_project(
    project: &ProjectInputs,
    params: &BertaudParameters,
    site: &SiteContext,
    assumptions: &FinancialAssumptions,
) -> Result<ProjectEvaluation, FarError> {
    let far = calculate_far(&FarInputs::from_project(project, params))?;

    let theoretical = theoretical_far(params.d0, params.g, params.distance_km);
    let proposed = project.proposed_gfa / units::rai_to_sqm(project.land_size_rai);
    let efficiency = far::efficiency(proposed, theoretical);

    let financial = evaluate_financials(
        &FinancialInputs {
            upfront_fee: project.upfront_fee,
            annual_rent: project.annual_rent,
            cost_per_sqm: project.cost_per_sqm,
            proposed_gfa: project.proposed_gfa,
            building_height_m: project.building_height_m,
            regional_factor: finance::regional_cost_factor(site.province.as_deref()),
        },
        assumptions,
    );

    let gradient_warning = bertaud::gradient_warning(params.g);
    if let Some(warning) = &gradient_warning {
        tracing::warn!(g = params.g, "{warning}");
    }

    tracing::debug!(
        project = %project.project_name,
        proposed_far = far.proposed_far,
        theoretical_far = far.theoretical_far,
        status = far.status.as_str(),
        npv = financial.npv,
        "evaluated project"
    );

    Ok(ProjectEvaluation {
        far,
        financial,
        gap: bertaud::gap_analysis(theoretical, far.legal_max_far),
        density_band: bertaud::density_band(efficiency, site.zone),
        gradient_warning,
        polycentric_far: polycentric_far(params, site),
    })
}

/// Density at the parcel from the CBD and the site's sub-centres; `None`
/// for a monocentric site.
#[must_use]
pub fn polycentric_far(params: &BertaudParameters, site: &SiteContext) -> Option<f64> {
    if site.sub_centers.is_empty() {
        return None;
    }
    let cbd = CenterInfluence {
        d0: params.d0,
        g: params.g,
        distance_km: params.distance_km,
    };
    let centers: Vec<CenterInfluence> = std::iter::once(cbd)
        .chain(site.sub_centers.iter().copied())
        .collect();
    Some(bertaud::polycentric_density(&centers))
}

/// Distance to the CBD from site coordinates, when both points are known.
#[must_use]
pub fn distance_from_site(site: &SiteContext) -> Option<f64> {
    match (site.location, site.cbd) {
        (Some(location), Some(cbd)) => Some(units::haversine_km(location, cbd)),
        _ => None,
    }
}

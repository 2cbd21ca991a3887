//! Paginated audit report.
//!
//! A report is built from a flattened [`ReportData`] record and always has
//! the same five pages. Pages are separated by form feeds so printers and
//! pagers break them correctly.

use crate::error::ExportError;
use crate::map;
use crate::model::{GeoPoint, GradeReport, ProjectEvaluation, ProjectInputs};
use chrono::{DateTime, Local};
use serde::Serialize;
use std::fmt::Write as _;
use std::path::Path;

pub const PAGE_COUNT: usize = 5;
pub const PAGE_BREAK: char = '\u{c}';
const RULE_WIDTH: usize = 72;

/// Every value the report prints, flattened from one evaluation snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportData {
    pub project_name: String,
    pub generated_at: String,
    pub overall_pass: bool,

    pub land_size_rai: f64,
    pub land_size_sqm: f64,
    pub proposed_gfa: f64,
    pub building_height_m: f64,

    pub proposed_far: f64,
    pub theoretical_far: f64,
    pub legal_max_far: f64,
    pub efficiency_score: f64,
    pub far_status: String,
    pub far_status_thai: String,
    pub density_band: String,
    pub gradient_warning: Option<String>,
    pub polycentric_far: Option<f64>,

    pub npv: f64,
    pub standard_cost: f64,
    pub cost_per_sqm: f64,
    pub cost_deviation_percent: f64,
    pub cost_status: String,
    pub roa_percent: f64,
    pub roa_status: String,
    pub breakeven_years: Option<f64>,
    pub discount_rate_percent: f64,
    /// NPV two points below the discount rate (floored at 0%).
    pub npv_rate_minus_two: f64,
    pub npv_rate_plus_two: f64,

    pub far_gap: f64,
    pub is_constrained: bool,
    pub recommendation: String,

    pub grade: Option<String>,
    pub grade_score: Option<f64>,
    pub grade_provider: Option<String>,

    pub location: Option<GeoPoint>,
    pub map_url: Option<String>,
}

impl ReportData {
    #[must_use]
    pub fn new(
        project: &ProjectInputs,
        evaluation: &ProjectEvaluation,
        grade: Option<&GradeReport>,
        generated_at: DateTime<Local>,
    ) -> Self {
        let far = &evaluation.far;
        let fin = &evaluation.financial;

        Self {
            project_name: project.project_name.clone(),
            generated_at: generated_at.format("%Y-%m-%d %H:%M").to_string(),
            overall_pass: evaluation.passes(),
            land_size_rai: project.land_size_rai,
            land_size_sqm: far.land_size_sqm,
            proposed_gfa: project.proposed_gfa,
            building_height_m: project.building_height_m,
            proposed_far: far.proposed_far,
            theoretical_far: far.theoretical_far,
            legal_max_far: far.legal_max_far,
            efficiency_score: far.efficiency_score,
            far_status: far.status.as_str().to_string(),
            far_status_thai: far.status.thai_label().to_string(),
            density_band: evaluation.density_band.as_str().to_string(),
            gradient_warning: evaluation.gradient_warning.clone(),
            polycentric_far: evaluation.polycentric_far,
            npv: fin.npv,
            standard_cost: fin.standard_cost,
            cost_per_sqm: project.cost_per_sqm,
            cost_deviation_percent: fin.cost_deviation_percent(),
            cost_status: fin.cost_status.as_str().to_string(),
            roa_percent: fin.roa_percent(),
            roa_status: fin.roa_status.as_str().to_string(),
            breakeven_years: fin.breakeven_years,
            discount_rate_percent: fin.sensitivity.base_rate * 100.0,
            npv_rate_minus_two: fin.sensitivity.minus_two_npv,
            npv_rate_plus_two: fin.sensitivity.plus_two_npv,
            far_gap: evaluation.gap.far_gap,
            is_constrained: evaluation.gap.is_constrained,
            recommendation: evaluation.gap.recommendation.as_str().to_string(),
            grade: grade.map(|g| g.grade.as_str().to_string()),
            grade_score: grade.map(|g| g.overall_score),
            grade_provider: grade.map(|g| g.provider.clone()),
            location: None,
            map_url: None,
        }
    }

    /// Adds the parcel location and its map link to page 1.
    #[must_use]
    pub fn with_location(mut self, location: Option<GeoPoint>) -> Self {
        self.location = location;
        self.map_url = location.map(|point| map::view_url(point, 16));
        self
    }

    /// `(metric, value, status)` rows shared by the CSV export and page 4.
    #[must_use]
    pub fn metric_rows(&self) -> Vec<[String; 3]> {
        let npv_status = if self.npv > 0.0 { "Positive" } else { "Negative" };
        let mut rows = vec![
            [
                "Proposed FAR".to_string(),
                format!("{:.2}", self.proposed_far),
                self.far_status.clone(),
            ],
            [
                "Theoretical FAR (Bertaud)".to_string(),
                format!("{:.2}", self.theoretical_far),
                "-".to_string(),
            ],
            [
                "Legal max FAR".to_string(),
                format!("{:.2}", self.legal_max_far),
                if self.is_constrained {
                    "Constrained".to_string()
                } else {
                    "Headroom".to_string()
                },
            ],
            [
                "Efficiency score".to_string(),
                format!("{:.2}", self.efficiency_score),
                self.density_band.clone(),
            ],
            [
                "State NPV".to_string(),
                format_money(self.npv),
                npv_status.to_string(),
            ],
            [
                "Cost deviation".to_string(),
                format!("{:+.2}%", self.cost_deviation_percent),
                self.cost_status.clone(),
            ],
            [
                "Return on assets".to_string(),
                format!("{:.2}%", self.roa_percent),
                self.roa_status.clone(),
            ],
        ];
        if let (Some(grade), Some(score)) = (&self.grade, self.grade_score) {
            rows.push([
                "Blueprint grade".to_string(),
                format!("{score:.1}"),
                grade.clone(),
            ]);
        }
        rows
    }
}

/// Renders all five pages.
#[must_use]
pub fn render_report(data: &ReportData) -> String {
    let pages = [
        render_summary(data),
        render_efficiency(data),
        render_financial(data),
        render_comparison(data),
        render_legal(data),
    ];

    pages
        .iter()
        .enumerate()
        .map(|(i, body)| {
            format!(
                "{body}\n{}\nGenerated by land-audit {}  |  Page {} of {PAGE_COUNT}\n",
                "-".repeat(RULE_WIDTH),
                data.generated_at,
                i + 1,
            )
        })
        .collect::<Vec<_>>()
        .join(&PAGE_BREAK.to_string())
}

/// Writes the rendered report to `path`.
pub fn export_report<P: AsRef<Path>>(data: &ReportData, path: P) -> Result<(), ExportError> {
    let path_ref = path.as_ref();
    std::fs::write(path_ref, render_report(data)).map_err(|source| ExportError::FileCreate {
        path: path_ref.to_path_buf(),
        source,
    })
}

fn heading(title: &str) -> String {
    format!("{title}\n{}\n", "=".repeat(title.chars().count()))
}

fn render_summary(d: &ReportData) -> String {
    let mut out = String::new();
    out.push_str(&heading("Land Development Audit Report"));
    let _ = writeln!(out, "Project:   {}", d.project_name);
    let _ = writeln!(out, "Generated: {}\n", d.generated_at);
    out.push_str(&heading("1. Executive Summary"));
    let verdict = if d.overall_pass { "PASS" } else { "REVIEW REQUIRED" };
    let _ = writeln!(out, "Overall status: {verdict}\n");
    let _ = writeln!(
        out,
        "The proposal builds {:.0} m² on {:.2} rai ({:.0} m²), a FAR of {:.2} \
         against a Bertaud optimum of {:.2}. Density is {} ({}).",
        d.proposed_gfa,
        d.land_size_rai,
        d.land_size_sqm,
        d.proposed_far,
        d.theoretical_far,
        d.far_status,
        d.density_band,
    );
    let _ = writeln!(
        out,
        "State NPV over the lease is {} with ROA {:.2}% ({}); construction cost {}.",
        format_money(d.npv),
        d.roa_percent,
        d.roa_status,
        d.cost_status,
    );
    if let (Some(grade), Some(provider)) = (&d.grade, &d.grade_provider) {
        let _ = writeln!(out, "Blueprint grade: {grade} (by {provider}).");
    }
    if let (Some(point), Some(url)) = (d.location, &d.map_url) {
        let _ = writeln!(out, "\nLocation: {:.5}, {:.5}", point.lat, point.lon);
        let _ = writeln!(out, "Map:      {url}");
    }
    out
}

fn render_efficiency(d: &ReportData) -> String {
    let mut out = heading("2. Efficiency Analysis (Bertaud Density Model)");
    let _ = writeln!(out, "Theoretical FAR  D(x) = D0 * e^(-g*x): {:.2}", d.theoretical_far);
    let _ = writeln!(out, "Proposed FAR     GFA / land area:      {:.2}", d.proposed_far);
    let _ = writeln!(out, "Efficiency index proposed / theoretical: {:.2}", d.efficiency_score);
    let _ = writeln!(out, "Status:          {}", d.far_status);
    let _ = writeln!(out, "                 {}", d.far_status_thai);
    let _ = writeln!(out, "Density band:    {}", d.density_band);
    if let Some(polycentric) = d.polycentric_far {
        let _ = writeln!(out, "Polycentric FAR  CBD + sub-centres:    {polycentric:.2}");
    }
    out.push('\n');
    out.push_str("Scale: < 0.80 under-utilized | 0.80 - 1.20 optimal | > 1.20 over-dense\n");
    if let Some(warning) = &d.gradient_warning {
        let _ = writeln!(out, "\nNote: {warning}");
    }
    out
}

fn render_financial(d: &ReportData) -> String {
    let mut out = heading("3. Financial Audit");
    let _ = writeln!(out, "State NPV:             {}", format_money(d.npv));
    let _ = writeln!(out, "Benchmark cost:        {} / m²", format_money(d.standard_cost));
    let _ = writeln!(out, "Proposed cost:         {} / m²", format_money(d.cost_per_sqm));
    let _ = writeln!(
        out,
        "Cost deviation:        {:+.2}%  [{}]",
        d.cost_deviation_percent, d.cost_status
    );
    let _ = writeln!(
        out,
        "Return on assets:      {:.2}%  [{}]",
        d.roa_percent, d.roa_status
    );
    let breakeven = d.breakeven_years.map_or_else(
        || "not reached at this rent".to_string(),
        |years| format!("{years:.1} years"),
    );
    let _ = writeln!(out, "Breakeven lease term:  {breakeven}");

    out.push('\n');
    out.push_str("Discount rate sensitivity\n");
    let low_rate = (d.discount_rate_percent - 2.0).max(0.0);
    let high_rate = d.discount_rate_percent + 2.0;
    let _ = writeln!(out, "  NPV at {low_rate:.2}%:  {}", format_money(d.npv_rate_minus_two));
    let _ = writeln!(out, "  NPV at {:.2}%:  {}", d.discount_rate_percent, format_money(d.npv));
    let _ = writeln!(out, "  NPV at {high_rate:.2}%:  {}", format_money(d.npv_rate_plus_two));
    out
}

fn render_comparison(d: &ReportData) -> String {
    let mut out = heading("4. Comparative Table");
    let _ = writeln!(out, "{:<28}{:>22}  {}", "Metric", "Value", "Status");
    let _ = writeln!(out, "{}", "-".repeat(RULE_WIDTH));
    for [metric, value, status] in d.metric_rows() {
        let _ = writeln!(out, "{metric:<28}{value:>22}  {status}");
    }
    out
}

fn render_legal(d: &ReportData) -> String {
    let mut out = heading("5. Legal Limits & Recommendation");
    let _ = writeln!(out, "Legal maximum FAR:     {:.2}", d.legal_max_far);
    let _ = writeln!(out, "Market-supported FAR:  {:.2}", d.theoretical_far);
    let _ = writeln!(out, "Gap (market - legal):  {:+.2}", d.far_gap);
    let _ = writeln!(
        out,
        "Zoning constraint:     {}",
        if d.is_constrained { "active" } else { "inactive" }
    );
    let _ = writeln!(out, "Policy recommendation: {}\n", d.recommendation);
    let advice = match d.far_status.as_str() {
        "UNDER" => "Increase floor area toward the Bertaud optimum before approval.",
        "OVER" => "Reduce floor area or justify infrastructure capacity.",
        _ => "Density is consistent with the model; proceed on financial review.",
    };
    let _ = writeln!(out, "Recommendation: {advice}");
    out
}

/// Thousands-separated amount with two decimals, e.g. `1,234,567.89`.
#[must_use]
pub fn format_money(amount: f64) -> String {
    let rounded = (amount * 100.0).round() / 100.0;
    let formatted = format!("{:.2}", rounded.abs());
    let (int_part, frac_part) = formatted.split_once('.').unwrap_or((formatted.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if rounded < 0.0 { "-" } else { "" };
    format!("{sign}{grouped}.{frac_part}")
}

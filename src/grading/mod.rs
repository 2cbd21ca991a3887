//! Blueprint grading.
//!
//! One capability, [`BlueprintGrader::grade`], with interchangeable
//! strategies: a deterministic local heuristic and prompted calls to hosted
//! language/vision models. Hosted responses are free text; [`extract`]
//! normalizes them into a [`GradeReport`].

pub mod extract;
pub mod heuristic;
pub mod remote;

pub use crate::error::GradingError;
pub use heuristic::HeuristicGrader;
pub use remote::{RemoteGrader, Vendor};

use crate::config::GradingConfig;
use crate::model::{GradeCategory, GradeReport, ProjectEvaluation, ProjectInputs};
use crate::settings::GraderSettings;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

const PDF_SIGNATURE: &[u8] = b"%PDF-";

/// Which grading strategy to use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    #[default]
    Heuristic,
    #[serde(rename = "openai")]
    OpenAi,
    Gemini,
    Anthropic,
}

impl Provider {
    pub const ALL: [Self; 4] = [Self::Heuristic, Self::OpenAi, Self::Gemini, Self::Anthropic];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Heuristic => "heuristic",
            Self::OpenAi => "openai",
            Self::Gemini => "gemini",
            Self::Anthropic => "anthropic",
        }
    }

    #[must_use]
    pub const fn needs_api_key(self) -> bool {
        !matches!(self, Self::Heuristic)
    }

    /// Next provider in [`Provider::ALL`], wrapping around.
    #[must_use]
    pub fn next(self) -> Self {
        let index = Self::ALL.iter().position(|p| *p == self).unwrap_or(0);
        Self::ALL[(index + 1) % Self::ALL.len()]
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "heuristic" | "local" | "mock" => Ok(Self::Heuristic),
            "openai" | "gpt" => Ok(Self::OpenAi),
            "gemini" | "google" => Ok(Self::Gemini),
            "anthropic" | "claude" => Ok(Self::Anthropic),
            other => Err(format!("unknown grading provider '{other}'")),
        }
    }
}

/// An uploaded blueprint document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blueprint {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl Blueprint {
    /// Wraps raw bytes, rejecting anything without the PDF signature.
    pub fn from_bytes(file_name: impl Into<String>, bytes: Vec<u8>) -> Result<Self, GradingError> {
        let file_name = file_name.into();
        if !bytes.starts_with(PDF_SIGNATURE) {
            return Err(GradingError::NotPdf { file_name });
        }
        Ok(Self { file_name, bytes })
    }

    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, GradingError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| GradingError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        let file_name = path
            .file_name()
            .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().to_string());
        Self::from_bytes(file_name, bytes)
    }

    /// Rough page count from `/Type /Page` and `/Type/Page` markers,
    /// skipping the `/Pages` tree nodes.
    #[must_use]
    pub fn page_count(&self) -> usize {
        [b"/Type /Page".as_slice(), b"/Type/Page".as_slice()]
            .iter()
            .map(|needle| {
                (0..self.bytes.len())
                    .filter(|&at| self.bytes[at..].starts_with(needle))
                    .filter(|&at| self.bytes.get(at + needle.len()) != Some(&b's'))
                    .count()
            })
            .sum()
    }
}

/// Project numbers the grader is told about.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GradingContext {
    pub land_size_rai: f64,
    pub proposed_gfa: f64,
    pub building_height_m: f64,
    pub cost_per_sqm: f64,
    pub proposed_far: f64,
    pub theoretical_far: f64,
    pub legal_max_far: f64,
    pub efficiency_score: f64,
    pub cost_deviation: f64,
    pub roa: f64,
}

impl GradingContext {
    #[must_use]
    pub fn new(project: &ProjectInputs, evaluation: &ProjectEvaluation) -> Self {
        Self {
            land_size_rai: project.land_size_rai,
            proposed_gfa: project.proposed_gfa,
            building_height_m: project.building_height_m,
            cost_per_sqm: project.cost_per_sqm,
            proposed_far: evaluation.far.proposed_far,
            theoretical_far: evaluation.far.theoretical_far,
            legal_max_far: evaluation.far.legal_max_far,
            efficiency_score: evaluation.far.efficiency_score,
            cost_deviation: evaluation.financial.cost_deviation,
            roa: evaluation.financial.roa,
        }
    }
}

/// Grades a blueprint in the context of a project.
pub trait BlueprintGrader {
    /// Provider name recorded in the report.
    fn name(&self) -> &'static str;

    fn grade(&self, blueprint: &Blueprint, context: &GradingContext)
        -> Result<GradeReport, GradingError>;
}

/// Builds the grader selected by the settings.
///
/// # Errors
///
/// [`GradingError::MissingApiKey`] if a hosted provider has no credential.
pub fn build_grader(
    settings: &GraderSettings,
    config: &GradingConfig,
) -> Result<Box<dyn BlueprintGrader>, GradingError> {
    let vendor = match settings.provider {
        Provider::Heuristic => return Ok(Box::new(HeuristicGrader)),
        Provider::OpenAi => Vendor::OpenAi,
        Provider::Gemini => Vendor::Gemini,
        Provider::Anthropic => Vendor::Anthropic,
    };

    let api_key = settings
        .api_key
        .clone()
        .filter(|k| !k.is_empty())
        .ok_or_else(|| GradingError::MissingApiKey {
            provider: settings.provider.to_string(),
        })?;

    let mut grader = RemoteGrader::new(vendor, api_key, config.timeout_secs)?;
    if let Some(model) = config.model_for(settings.provider) {
        grader = grader.with_model(model);
    }
    if let Some(base_url) = config.endpoint_for(settings.provider) {
        grader = grader.with_base_url(base_url);
    }
    Ok(Box::new(grader))
}

/// Instruction sent to every hosted model.
#[must_use]
pub fn build_prompt(context: &GradingContext) -> String {
    let keys: Vec<String> = GradeCategory::ALL
        .iter()
        .map(|c| format!("\"{}\": {{\"score\": <0-100>, \"comment\": \"...\"}}", c.key()))
        .collect();

    format!(
        "You are auditing a land development proposal. Review the attached blueprint \
         together with these project figures:\n\
         - Land size: {:.2} rai\n\
         - Proposed gross floor area: {:.0} m²\n\
         - Building height: {:.1} m\n\
         - Construction cost: {:.0} per m²\n\
         - Proposed FAR: {:.2} (theoretical {:.2}, legal maximum {:.2}, efficiency {:.2})\n\
         - Cost deviation from benchmark: {:.1}%\n\
         - Return on assets: {:.2}%\n\n\
         Reply with a single JSON object and nothing else, shaped as:\n\
         {{{}, \"summary\": \"...\"}}",
        context.land_size_rai,
        context.proposed_gfa,
        context.building_height_m,
        context.cost_per_sqm,
        context.proposed_far,
        context.theoretical_far,
        context.legal_max_far,
        context.efficiency_score,
        context.cost_deviation * 100.0,
        context.roa * 100.0,
        keys.join(", ")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context() -> GradingContext {
        GradingContext {
            land_size_rai: 5.0,
            proposed_gfa: 40_000.0,
            building_height_m: 45.0,
            cost_per_sqm: 30_000.0,
            proposed_far: 5.0,
            theoretical_far: 8.19,
            legal_max_far: 10.0,
            efficiency_score: 0.61,
            cost_deviation: 0.0,
            roa: 0.02,
        }
    }

    #[test]
    fn provider_parses_aliases() {
        assert_eq!("OpenAI".parse::<Provider>(), Ok(Provider::OpenAi));
        assert_eq!("claude".parse::<Provider>(), Ok(Provider::Anthropic));
        assert_eq!("mock".parse::<Provider>(), Ok(Provider::Heuristic));
        assert!("bard".parse::<Provider>().is_err());
    }

    #[test]
    fn provider_cycles_through_all() {
        let mut provider = Provider::Heuristic;
        for _ in 0..Provider::ALL.len() {
            provider = provider.next();
        }
        assert_eq!(provider, Provider::Heuristic);
    }

    #[test]
    fn blueprint_requires_pdf_signature() {
        assert!(Blueprint::from_bytes("plan.pdf", b"%PDF-1.7\n".to_vec()).is_ok());
        let err = Blueprint::from_bytes("plan.png", b"\x89PNG".to_vec()).unwrap_err();
        assert!(matches!(err, GradingError::NotPdf { .. }));
    }

    #[test]
    fn page_count_ignores_pages_tree() {
        let bytes = b"%PDF-1.4 /Type /Pages /Type /Page\n/Type /Page>>".to_vec();
        let blueprint = Blueprint::from_bytes("plan.pdf", bytes).unwrap();
        assert_eq!(blueprint.page_count(), 2);
    }

    #[test]
    fn page_count_reads_compact_markers_and_buffer_end() {
        let bytes = b"%PDF-1.7 <</Type/Pages>> <</Type/Page>> <</Type /Page".to_vec();
        let blueprint = Blueprint::from_bytes("plan.pdf", bytes).unwrap();
        assert_eq!(blueprint.page_count(), 2);
    }

    #[test]
    fn prompt_lists_every_category() {
        let prompt = build_prompt(&context());
        for category in GradeCategory::ALL {
            assert!(prompt.contains(category.key()));
        }
        assert!(prompt.contains("5.00 rai"));
    }

    #[test]
    fn hosted_provider_without_key_fails() {
        let settings = GraderSettings {
            provider: Provider::Gemini,
            api_key: None,
        };
        let err = build_grader(&settings, &GradingConfig::default()).err().unwrap();
        assert!(matches!(err, GradingError::MissingApiKey { .. }));
    }

    #[test]
    fn heuristic_needs_no_key() {
        let grader = build_grader(&GraderSettings::default(), &GradingConfig::default()).unwrap();
        assert_eq!(grader.name(), "heuristic");
    }
}

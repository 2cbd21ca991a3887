use serde::{Deserialize, Serialize};

/// The five fixed categories every grader must score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GradeCategory {
    FarCompliance,
    SpaceEfficiency,
    StructuralDesign,
    CostRealism,
    RegulatoryReadiness,
}

impl GradeCategory {
    pub const ALL: [Self; 5] = [
        Self::FarCompliance,
        Self::SpaceEfficiency,
        Self::StructuralDesign,
        Self::CostRealism,
        Self::RegulatoryReadiness,
    ];

    /// JSON key used in model prompts and responses.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::FarCompliance => "far_compliance",
            Self::SpaceEfficiency => "space_efficiency",
            Self::StructuralDesign => "structural_design",
            Self::CostRealism => "cost_realism",
            Self::RegulatoryReadiness => "regulatory_readiness",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::FarCompliance => "FAR compliance",
            Self::SpaceEfficiency => "Space efficiency",
            Self::StructuralDesign => "Structural design",
            Self::CostRealism => "Cost realism",
            Self::RegulatoryReadiness => "Regulatory readiness",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum LetterGrade {
    A,
    B,
    C,
    D,
    F,
}

impl LetterGrade {
    #[must_use]
    pub fn from_score(score: f64) -> Self {
        if score >= 90.0 {
            Self::A
        } else if score >= 80.0 {
            Self::B
        } else if score >= 70.0 {
            Self::C
        } else if score >= 60.0 {
            Self::D
        } else {
            Self::F
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
            Self::D => "D",
            Self::F => "F",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryScore {
    pub category: GradeCategory,
    /// 0–100.
    pub score: f64,
    pub comment: String,
}

/// Normalized output of any blueprint grader.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeReport {
    pub provider: String,
    pub categories: Vec<CategoryScore>,
    pub overall_score: f64,
    pub grade: LetterGrade,
    pub summary: String,
}

impl GradeReport {
    /// Builds a report from scores in [`GradeCategory::ALL`] order, deriving
    /// the overall score and letter grade.
    #[must_use]
    pub fn new(provider: impl Into<String>, categories: Vec<CategoryScore>, summary: String) -> Self {
        let overall_score = if categories.is_empty() {
            0.0
        } else {
            categories.iter().map(|c| c.score).sum::<f64>() / categories.len() as f64
        };
        let overall_score = (overall_score * 10.0).round() / 10.0;

        Self {
            provider: provider.into(),
            categories,
            overall_score,
            grade: LetterGrade::from_score(overall_score),
            summary,
        }
    }

    #[must_use]
    pub fn score_for(&self, category: GradeCategory) -> Option<f64> {
        self.categories
            .iter()
            .find(|c| c.category == category)
            .map(|c| c.score)
    }
}

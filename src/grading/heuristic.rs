//! Offline grader that scores the project numbers instead of the drawing.

use super::{Blueprint, BlueprintGrader, GradingContext, GradingError};
use crate::model::{CategoryScore, GradeCategory, GradeReport};

/// Deterministic local grader. The same context always yields the same
/// report; the blueprint only contributes its page count to the summary.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicGrader;

impl BlueprintGrader for HeuristicGrader {
    fn name(&self) -> &'static str {
        "heuristic"
    }

    fn grade(
        &self,
        blueprint: &Blueprint,
        context: &GradingContext,
    ) -> Result<GradeReport, GradingError> {
        let categories = GradeCategory::ALL
            .iter()
            .map(|&category| {
                let (score, comment) = score_category(category, context);
                CategoryScore {
                    category,
                    score: clamp_score(score),
                    comment,
                }
            })
            .collect();

        let summary = format!(
            "Local estimate for {} ({} page(s)) derived from project figures only.",
            blueprint.file_name,
            blueprint.page_count()
        );
        Ok(GradeReport::new(self.name(), categories, summary))
    }
}

fn score_category(category: GradeCategory, ctx: &GradingContext) -> (f64, String) {
    match category {
        GradeCategory::FarCompliance => {
            let miss = (ctx.efficiency_score - 1.0).abs();
            (
                100.0 - miss * 100.0,
                format!("Efficiency {:.2} against the Bertaud optimum", ctx.efficiency_score),
            )
        }
        GradeCategory::SpaceEfficiency => {
            if ctx.legal_max_far > 0.0 {
                let used = ctx.proposed_far / ctx.legal_max_far;
                (
                    40.0 + used.min(1.0) * 60.0,
                    format!("Uses {:.0}% of the permitted floor area", used * 100.0),
                )
            } else {
                (50.0, "No legal FAR ceiling given".to_string())
            }
        }
        GradeCategory::StructuralDesign => {
            let score = if ctx.building_height_m <= 23.0 {
                90.0
            } else if ctx.building_height_m <= 80.0 {
                80.0
            } else {
                70.0
            };
            (
                score,
                format!("{:.1} m building height", ctx.building_height_m),
            )
        }
        GradeCategory::CostRealism => (
            100.0 - ctx.cost_deviation.abs() * 200.0,
            format!(
                "Cost {:+.1}% from benchmark",
                ctx.cost_deviation * 100.0
            ),
        ),
        GradeCategory::RegulatoryReadiness => {
            if ctx.proposed_far <= ctx.legal_max_far {
                (85.0, "Within the legal FAR ceiling".to_string())
            } else {
                (30.0, "Exceeds the legal FAR ceiling".to_string())
            }
        }
    }
}

fn clamp_score(score: f64) -> f64 {
    if score.is_nan() {
        0.0
    } else {
        score.clamp(0.0, 100.0).round()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::LetterGrade;

    fn blueprint() -> Blueprint {
        Blueprint::from_bytes("plan.pdf", b"%PDF-1.4 /Type /Page>>".to_vec()).unwrap()
    }

    fn context(efficiency: f64, proposed_far: f64, cost_deviation: f64) -> GradingContext {
        GradingContext {
            land_size_rai: 5.0,
            proposed_gfa: proposed_far * 8000.0,
            building_height_m: 20.0,
            cost_per_sqm: 15_000.0,
            proposed_far,
            theoretical_far: proposed_far / efficiency,
            legal_max_far: 8.0,
            efficiency_score: efficiency,
            cost_deviation,
            roa: 0.04,
        }
    }

    #[test]
    fn ideal_project_scores_well() {
        let report = HeuristicGrader.grade(&blueprint(), &context(1.0, 8.0, 0.0)).unwrap();
        assert_eq!(report.score_for(GradeCategory::FarCompliance), Some(100.0));
        assert_eq!(report.score_for(GradeCategory::SpaceEfficiency), Some(100.0));
        assert_eq!(report.score_for(GradeCategory::CostRealism), Some(100.0));
        assert_eq!(report.grade, LetterGrade::A);
        assert!(report.summary.contains("1 page"));
    }

    #[test]
    fn over_ceiling_and_costly_project_scores_badly() {
        let report = HeuristicGrader.grade(&blueprint(), &context(1.9, 12.0, 0.6)).unwrap();
        assert_eq!(report.score_for(GradeCategory::FarCompliance), Some(10.0));
        assert_eq!(report.score_for(GradeCategory::CostRealism), Some(0.0));
        assert_eq!(report.score_for(GradeCategory::RegulatoryReadiness), Some(30.0));
        assert_eq!(report.grade, LetterGrade::F);
    }

    #[test]
    fn grading_is_deterministic() {
        let ctx = context(0.7, 4.0, 0.1);
        let a = HeuristicGrader.grade(&blueprint(), &ctx).unwrap();
        let b = HeuristicGrader.grade(&blueprint(), &ctx).unwrap();
        assert_eq!(a, b);
    }
}

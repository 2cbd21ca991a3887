pub mod evaluation;
pub mod grade;
pub mod inputs;

pub use evaluation::{
    CostStatus, DensityBand, FarErrorBody, FarEvaluation, FarResponse, FarStatus,
    FinancialEvaluation, GapAnalysis, PolicyRecommendation, ProjectEvaluation, RoaStatus,
    Sensitivity,
};
pub use grade::{CategoryScore, GradeCategory, GradeReport, LetterGrade};
pub use inputs::{
    BertaudParameters, CenterInfluence, DensitySample, FarInputs, GeoPoint, ProjectInputs,
    SiteContext, ZoneColor, DEFAULT_LEGAL_MAX_FAR,
};

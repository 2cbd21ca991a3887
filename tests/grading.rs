use land_audit::config::GradingConfig;
use land_audit::engine::{evaluate_project, FinancialAssumptions};
use land_audit::error::GradingError;
use land_audit::grading::extract::parse_grade_response;
use land_audit::grading::{build_grader, Blueprint, GradingContext, Provider};
use land_audit::model::{
    BertaudParameters, GradeCategory, LetterGrade, ProjectInputs, SiteContext,
};
use land_audit::settings::{FileStore, GraderSettings, KeyValueStore, MemoryStore};
use pretty_assertions::assert_eq;
use tempfile::tempdir;

const PDF: &[u8] = b"%PDF-1.7\n1 0 obj << /Type /Page >> endobj\n2 0 obj << /Type /Page >> endobj\n";

fn context() -> GradingContext {
    let project = ProjectInputs::default();
    let evaluation = evaluate_project(
        &project,
        &BertaudParameters::default(),
        &SiteContext::default(),
        &FinancialAssumptions::default(),
    )
    .unwrap();
    GradingContext::new(&project, &evaluation)
}

#[test]
fn heuristic_grades_blueprint_from_disk() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("tower.pdf");
    std::fs::write(&path, PDF).unwrap();

    let blueprint = Blueprint::open(&path).unwrap();
    assert_eq!(blueprint.file_name, "tower.pdf");
    assert_eq!(blueprint.page_count(), 2);

    let grader = build_grader(&GraderSettings::default(), &GradingConfig::default()).unwrap();
    let report = grader.grade(&blueprint, &context()).unwrap();

    assert_eq!(report.provider, "heuristic");
    assert_eq!(report.categories.len(), GradeCategory::ALL.len());
    assert!(report.categories.iter().all(|c| (0.0..=100.0).contains(&c.score)));
    assert_eq!(report.grade, LetterGrade::from_score(report.overall_score));
}

#[test]
fn non_pdf_upload_is_rejected() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("plan.png");
    std::fs::write(&path, b"\x89PNG\r\n").unwrap();

    let err = Blueprint::open(&path).unwrap_err();
    assert!(matches!(err, GradingError::NotPdf { ref file_name } if file_name == "plan.png"));
}

#[test]
fn missing_blueprint_file_is_a_read_error() {
    let dir = tempdir().unwrap();
    let err = Blueprint::open(dir.path().join("nope.pdf")).unwrap_err();
    assert!(matches!(err, GradingError::FileRead { .. }));
}

#[test]
fn hosted_providers_need_a_key() {
    for provider in [Provider::OpenAi, Provider::Gemini, Provider::Anthropic] {
        let settings = GraderSettings {
            provider,
            api_key: Some(String::new()),
        };
        let err = build_grader(&settings, &GradingConfig::default())
            .err()
            .expect("grader should not build without a key");
        assert!(matches!(err, GradingError::MissingApiKey { .. }));
    }
}

#[test]
fn hosted_provider_with_key_builds() {
    let settings = GraderSettings {
        provider: Provider::Anthropic,
        api_key: Some("test-key".to_string()),
    };
    let grader = build_grader(&settings, &GradingConfig::default()).unwrap();
    assert_eq!(grader.name(), "anthropic");
}

#[test]
fn settings_survive_reopening_the_store() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested").join("settings.json");

    let mut store = FileStore::open(&path).unwrap();
    let chosen = GraderSettings {
        provider: Provider::Gemini,
        api_key: Some("g-key".to_string()),
    };
    chosen.save(&mut store).unwrap();

    let reopened = FileStore::open(&path).unwrap();
    let loaded = GraderSettings::load(&reopened, &GraderSettings::default()).unwrap();
    assert_eq!(loaded, chosen);
}

#[test]
fn stored_settings_fall_back_to_config() {
    let mut store = MemoryStore::default();
    let fallback = GraderSettings {
        provider: Provider::OpenAi,
        api_key: Some("from-config".to_string()),
    };

    let loaded = GraderSettings::load(&store, &fallback).unwrap();
    assert_eq!(loaded, fallback);

    store.set("grader.provider", "claude").unwrap();
    let loaded = GraderSettings::load(&store, &fallback).unwrap();
    assert_eq!(loaded.provider, Provider::Anthropic);
    assert_eq!(loaded.api_key.as_deref(), Some("from-config"));
}

#[test]
fn model_reply_normalizes_to_report() {
    let reply = "Sure!\n{\"far_compliance\": {\"score\": \"91\", \"comment\": \"Good\"}, \"summary\": \"Fine\"}";
    let report = parse_grade_response("openai", reply).unwrap();

    assert_eq!(report.score_for(GradeCategory::FarCompliance), Some(91.0));
    assert_eq!(report.score_for(GradeCategory::CostRealism), Some(50.0));
    assert_eq!(report.summary, "Fine");
}

use crate::config::AppConfig;
use crate::engine::{evaluate_project, FarError};
use crate::export::{export_report, render_report, ReportData};
use crate::grading::{build_grader, Blueprint, GradingContext};
use crate::loader::ProjectFile;
use crate::model::{
    BertaudParameters, GradeReport, ProjectEvaluation, ProjectInputs, SiteContext,
    DEFAULT_LEGAL_MAX_FAR,
};
use crate::settings::{GraderSettings, KeyValueStore};
use color_eyre::Result;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::{DefaultTerminal, Frame};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Dashboard,
    Report,
}

/// Editable numeric inputs, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    LandSize,
    Gfa,
    Height,
    Cost,
    Upfront,
    Rent,
    D0,
    Gradient,
    Distance,
    LegalMax,
}

impl Field {
    pub const ALL: [Self; 10] = [
        Self::LandSize,
        Self::Gfa,
        Self::Height,
        Self::Cost,
        Self::Upfront,
        Self::Rent,
        Self::D0,
        Self::Gradient,
        Self::Distance,
        Self::LegalMax,
    ];

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::LandSize => "Land size",
            Self::Gfa => "Proposed GFA",
            Self::Height => "Building height",
            Self::Cost => "Cost per m²",
            Self::Upfront => "Upfront fee",
            Self::Rent => "Annual rent",
            Self::D0 => "Central density D0",
            Self::Gradient => "Density gradient g",
            Self::Distance => "Distance to CBD",
            Self::LegalMax => "Legal max FAR",
        }
    }

    #[must_use]
    pub const fn unit(self) -> &'static str {
        match self {
            Self::LandSize => "rai",
            Self::Gfa => "m²",
            Self::Height | Self::D0 | Self::Gradient | Self::LegalMax => "",
            Self::Cost | Self::Upfront | Self::Rent => "THB",
            Self::Distance => "km",
        }
    }

    /// Increment applied by `+` and `-`.
    #[must_use]
    pub const fn step(self) -> f64 {
        match self {
            Self::LandSize | Self::D0 | Self::Distance | Self::LegalMax => 0.5,
            Self::Gfa | Self::Cost => 1_000.0,
            Self::Height => 3.0,
            Self::Upfront => 1_000_000.0,
            Self::Rent => 100_000.0,
            Self::Gradient => 0.01,
        }
    }

    #[must_use]
    pub const fn decimals(self) -> usize {
        match self {
            Self::Gfa | Self::Cost | Self::Upfront | Self::Rent => 0,
            Self::Height | Self::D0 | Self::Distance => 1,
            Self::LandSize | Self::Gradient | Self::LegalMax => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditTarget {
    Field(Field),
    ApiKey,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    pub target: EditTarget,
    pub buffer: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Info(String),
    Error(String),
}

pub struct App {
    pub project: ProjectInputs,
    pub params: BertaudParameters,
    pub site: SiteContext,
    pub config: AppConfig,
    pub settings: GraderSettings,
    store: Option<Box<dyn KeyValueStore>>,
    pub blueprint: Option<Blueprint>,
    pub evaluation: std::result::Result<ProjectEvaluation, FarError>,
    pub grade: Option<GradeReport>,
    pub view: View,
    pub selected: usize,
    pub edit: Option<Edit>,
    pub notice: Option<Notice>,
    pub report_scroll: u16,
    pub should_quit: bool,
}

impl App {
    #[must_use]
    pub fn new(file: ProjectFile, config: AppConfig, settings: GraderSettings) -> Self {
        let ProjectFile {
            project,
            bertaud,
            site,
            ..
        } = file;
        let evaluation = evaluate_project(&project, &bertaud, &site, &config.finance);

        Self {
            project,
            params: bertaud,
            site,
            config,
            settings,
            store: None,
            blueprint: None,
            evaluation,
            grade: None,
            view: View::Dashboard,
            selected: 0,
            edit: None,
            notice: None,
            report_scroll: 0,
            should_quit: false,
        }
    }

    /// Persist provider and credential changes to `store`.
    #[must_use]
    pub fn with_store(mut self, store: Box<dyn KeyValueStore>) -> Self {
        self.store = Some(store);
        self
    }

    #[must_use]
    pub fn with_blueprint(mut self, blueprint: Blueprint) -> Self {
        self.blueprint = Some(blueprint);
        self
    }

    pub fn run(mut self, mut terminal: DefaultTerminal) -> Result<()> {
        while !self.should_quit {
            terminal.draw(|frame| self.draw(frame))?;
            self.handle_events()?;
        }
        Ok(())
    }

    fn draw(&self, frame: &mut Frame) {
        match self.view {
            View::Dashboard => super::dashboard::draw_dashboard(frame, self),
            View::Report => super::dashboard::draw_report(frame, self),
        }
    }

    fn handle_events(&mut self) -> Result<()> {
        if let Event::Key(key) = event::read()? {
            if key.kind == KeyEventKind::Press {
                self.handle_key(key.code);
            }
        }
        Ok(())
    }

    pub fn handle_key(&mut self, code: KeyCode) {
        if self.edit.is_some() {
            self.handle_edit_keys(code);
            return;
        }

        match self.view {
            View::Dashboard => self.handle_dashboard_keys(code),
            View::Report => self.handle_report_keys(code),
        }
    }

    fn handle_dashboard_keys(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Esc => self.notice = None,
            KeyCode::Up | KeyCode::Char('k') => {
                self.selected = self.selected.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.selected < Field::ALL.len() - 1 {
                    self.selected += 1;
                }
            }
            KeyCode::Enter => self.begin_edit(EditTarget::Field(self.selected_field())),
            KeyCode::Char('a') => self.begin_edit(EditTarget::ApiKey),
            KeyCode::Char('+' | '=') => self.nudge(1.0),
            KeyCode::Char('-') => self.nudge(-1.0),
            KeyCode::Char('r') => {
                self.view = View::Report;
                self.report_scroll = 0;
            }
            KeyCode::Char('e') => self.export_report(),
            KeyCode::Char('g') => self.grade_blueprint(),
            KeyCode::Char('p') => self.cycle_provider(),
            _ => {}
        }
    }

    fn handle_report_keys(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Esc | KeyCode::Backspace | KeyCode::Char('r') => {
                self.view = View::Dashboard;
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.report_scroll = self.report_scroll.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.report_scroll = self.report_scroll.saturating_add(1);
            }
            KeyCode::PageUp => self.report_scroll = self.report_scroll.saturating_sub(20),
            KeyCode::PageDown => self.report_scroll = self.report_scroll.saturating_add(20),
            KeyCode::Char('e') => self.export_report(),
            _ => {}
        }
    }

    fn handle_edit_keys(&mut self, code: KeyCode) {
        let Some(edit) = self.edit.as_mut() else {
            return;
        };

        match code {
            KeyCode::Esc => self.edit = None,
            KeyCode::Enter => self.commit_edit(),
            KeyCode::Backspace => {
                edit.buffer.pop();
            }
            KeyCode::Char(c) => {
                let accepted = match edit.target {
                    EditTarget::Field(_) => c.is_ascii_digit() || matches!(c, '.' | '-' | ','),
                    EditTarget::ApiKey => !c.is_control(),
                };
                if accepted {
                    edit.buffer.push(c);
                }
            }
            _ => {}
        }
    }

    #[must_use]
    pub fn selected_field(&self) -> Field {
        Field::ALL[self.selected.min(Field::ALL.len() - 1)]
    }

    #[must_use]
    pub fn field_value(&self, field: Field) -> f64 {
        match field {
            Field::LandSize => self.project.land_size_rai,
            Field::Gfa => self.project.proposed_gfa,
            Field::Height => self.project.building_height_m,
            Field::Cost => self.project.cost_per_sqm,
            Field::Upfront => self.project.upfront_fee,
            Field::Rent => self.project.annual_rent,
            Field::D0 => self.params.d0,
            Field::Gradient => self.params.g,
            Field::Distance => self.params.distance_km,
            Field::LegalMax => self.params.legal_max_far.unwrap_or(DEFAULT_LEGAL_MAX_FAR),
        }
    }

    /// Sets one input and re-runs the evaluation.
    pub fn set_field(&mut self, field: Field, value: f64) {
        match field {
            Field::LandSize => self.project.land_size_rai = value,
            Field::Gfa => self.project.proposed_gfa = value,
            Field::Height => self.project.building_height_m = value,
            Field::Cost => self.project.cost_per_sqm = value,
            Field::Upfront => self.project.upfront_fee = value,
            Field::Rent => self.project.annual_rent = value,
            Field::D0 => self.params.d0 = value,
            Field::Gradient => self.params.g = value,
            Field::Distance => self.params.distance_km = value,
            Field::LegalMax => self.params.legal_max_far = Some(value),
        }
        self.recompute();
    }

    /// Evaluates the current inputs. A stale grade is kept since the
    /// blueprint it describes has not changed.
    pub fn recompute(&mut self) {
        self.evaluation =
            evaluate_project(&self.project, &self.params, &self.site, &self.config.finance);
    }

    fn begin_edit(&mut self, target: EditTarget) {
        let buffer = match target {
            EditTarget::Field(field) => {
                format!("{:.*}", field.decimals(), self.field_value(field))
            }
            EditTarget::ApiKey => String::new(),
        };
        self.edit = Some(Edit { target, buffer });
    }

    fn commit_edit(&mut self) {
        let Some(edit) = self.edit.take() else {
            return;
        };

        match edit.target {
            EditTarget::Field(field) => match parse_number(&edit.buffer) {
                Some(value) => {
                    self.set_field(field, value);
                    self.notice = None;
                }
                None => {
                    self.notice = Some(Notice::Error(format!(
                        "'{}' is not a number; {} unchanged",
                        edit.buffer,
                        field.label()
                    )));
                }
            },
            EditTarget::ApiKey => {
                let key = edit.buffer.trim().to_string();
                self.settings.api_key = (!key.is_empty()).then_some(key);
                self.persist_settings("API key saved");
            }
        }
    }

    fn nudge(&mut self, direction: f64) {
        let field = self.selected_field();
        let stepped = self.field_value(field) + field.step() * direction;
        let scale = 10_f64.powi(i32::try_from(field.decimals()).unwrap_or(2));
        let value = ((stepped * scale).round() / scale).max(0.0);
        self.set_field(field, value);
    }

    fn cycle_provider(&mut self) {
        self.settings.provider = self.settings.provider.next();
        let message = format!("Grading provider: {}", self.settings.provider);
        self.persist_settings(&message);
    }

    fn persist_settings(&mut self, message: &str) {
        let saved = match self.store.as_deref_mut() {
            Some(store) => self.settings.save(store),
            None => Ok(()),
        };

        self.notice = Some(match saved {
            Ok(()) => Notice::Info(message.to_string()),
            Err(e) => {
                tracing::warn!(error = %e, "could not save grader settings");
                Notice::Error(format!("{message} (not saved: {e})"))
            }
        });
    }

    /// Runs the configured grader against the loaded blueprint.
    pub fn grade_blueprint(&mut self) {
        let Some(blueprint) = &self.blueprint else {
            self.notice = Some(Notice::Error(
                "No blueprint loaded; start with --blueprint <PDF>".to_string(),
            ));
            return;
        };
        let Ok(evaluation) = &self.evaluation else {
            self.notice = Some(Notice::Error(
                "Fix the inputs before grading".to_string(),
            ));
            return;
        };

        let context = GradingContext::new(&self.project, evaluation);
        let result = build_grader(&self.settings, &self.config.grading)
            .and_then(|grader| grader.grade(blueprint, &context));

        match result {
            Ok(report) => {
                self.notice = Some(Notice::Info(format!(
                    "Graded by {}: {} ({:.1})",
                    report.provider,
                    report.grade.as_str(),
                    report.overall_score
                )));
                self.grade = Some(report);
            }
            Err(e) => {
                tracing::warn!(provider = %self.settings.provider, error = %e, "grading failed");
                self.notice = Some(Notice::Error(format!("Grading failed: {e}")));
            }
        }
    }

    #[must_use]
    pub fn report_data(&self) -> Option<ReportData> {
        let evaluation = self.evaluation.as_ref().ok()?;
        Some(
            ReportData::new(
                &self.project,
                evaluation,
                self.grade.as_ref(),
                chrono::Local::now(),
            )
            .with_location(self.site.location),
        )
    }

    #[must_use]
    pub fn report_text(&self) -> Option<String> {
        self.report_data().map(|data| render_report(&data))
    }

    /// Where `e` writes the report.
    #[must_use]
    pub fn report_path(&self) -> PathBuf {
        let dir = self
            .config
            .general
            .report_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("."));
        dir.join(format!("{}-report.txt", file_stem(&self.project.project_name)))
    }

    fn export_report(&mut self) {
        let Some(data) = self.report_data() else {
            self.notice = Some(Notice::Error(
                "Nothing to export until the inputs are valid".to_string(),
            ));
            return;
        };

        let path = self.report_path();
        self.notice = Some(match export_report(&data, &path) {
            Ok(()) => Notice::Info(format!("Report written to {}", path.display())),
            Err(e) => Notice::Error(e.to_string()),
        });
    }
}

fn parse_number(text: &str) -> Option<f64> {
    let cleaned: String = text.chars().filter(|c| *c != ',').collect();
    cleaned.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

fn file_stem(name: &str) -> String {
    let stem: String = name
        .trim()
        .chars()
        .map(|c| if c.is_alphanumeric() { c.to_ascii_lowercase() } else { '-' })
        .collect();
    let stem = stem.trim_matches('-');
    if stem.is_empty() {
        "project".to_string()
    } else {
        stem.to_string()
    }
}

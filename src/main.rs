use clap::Parser;
use color_eyre::eyre::{eyre, WrapErr};
use color_eyre::Result;
use std::path::{Path, PathBuf};
use tracing_subscriber::fmt::writer::BoxMakeWriter;

use land_audit::config::AppConfig;
use land_audit::engine::evaluate_project;
use land_audit::engine::units::parse_title_deed_area;
use land_audit::export::{export_csv, export_json, export_report, render_report};
use land_audit::export::{EvaluationSnapshot, ReportData};
use land_audit::grading::{build_grader, Blueprint, GradingContext, Provider};
use land_audit::loader::{load_project_file, ProjectFile};
use land_audit::map::export_map_html;
use land_audit::settings::{FileStore, GraderSettings};
use land_audit::ui::App;

const LOG_ENV: &str = "LAND_AUDIT_LOG";

#[derive(Parser, Debug)]
#[command(name = "land-audit")]
#[command(about = "Land Audit - FAR, financial and blueprint checks for development proposals")]
#[command(version)]
struct Args {
    /// Project file (JSON or TOML)
    file: Option<PathBuf>,

    /// Land size in rai
    #[arg(long, value_name = "RAI")]
    land_rai: Option<f64>,

    /// Land size as written on the title deed, e.g. 2-1-50
    #[arg(
        long,
        value_name = "RAI-NGAN-WAH",
        value_parser = parse_land_title,
        conflicts_with = "land_rai"
    )]
    land_title: Option<f64>,

    /// Proposed gross floor area in m²
    #[arg(long, value_name = "SQM")]
    gfa: Option<f64>,

    /// Building height in metres
    #[arg(long, value_name = "M")]
    height: Option<f64>,

    /// Construction cost per m²
    #[arg(long, value_name = "THB")]
    cost: Option<f64>,

    /// Upfront lease fee
    #[arg(long, value_name = "THB")]
    upfront: Option<f64>,

    /// Annual rent in the first year
    #[arg(long, value_name = "THB")]
    rent: Option<f64>,

    /// Central density D0
    #[arg(long)]
    d0: Option<f64>,

    /// Density gradient g
    #[arg(long)]
    g: Option<f64>,

    /// Distance from the CBD in km
    #[arg(long, value_name = "KM")]
    distance: Option<f64>,

    /// Legal maximum FAR
    #[arg(long, value_name = "FAR")]
    legal_max: Option<f64>,

    /// Export the evaluation to JSON
    #[arg(long, value_name = "FILE")]
    json: Option<PathBuf>,

    /// Export the metric table to CSV
    #[arg(long, value_name = "FILE")]
    csv: Option<PathBuf>,

    /// Write the five-page report
    #[arg(long, value_name = "FILE")]
    report: Option<PathBuf>,

    /// Write an HTML page with the site map (needs site.location)
    #[arg(long, value_name = "FILE")]
    map: Option<PathBuf>,

    /// Blueprint PDF to grade
    #[arg(long, value_name = "PDF")]
    blueprint: Option<PathBuf>,

    /// Grading provider for this run (heuristic, openai, gemini, anthropic)
    #[arg(long, value_name = "PROVIDER")]
    provider: Option<Provider>,

    /// Print the report to stdout and exit
    #[arg(long)]
    print: bool,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn is_headless(&self) -> bool {
        self.print
            || self.json.is_some()
            || self.csv.is_some()
            || self.report.is_some()
            || self.map.is_some()
    }

    fn apply_overrides(&self, file: &mut ProjectFile) {
        let project = &mut file.project;
        let params = &mut file.bertaud;

        let overrides = [
            (self.land_rai.or(self.land_title), &mut project.land_size_rai),
            (self.gfa, &mut project.proposed_gfa),
            (self.height, &mut project.building_height_m),
            (self.cost, &mut project.cost_per_sqm),
            (self.upfront, &mut project.upfront_fee),
            (self.rent, &mut project.annual_rent),
            (self.d0, &mut params.d0),
            (self.g, &mut params.g),
            (self.distance, &mut params.distance_km),
        ];
        for (value, slot) in overrides {
            if let Some(value) = value {
                *slot = value;
            }
        }
        if self.legal_max.is_some() {
            params.legal_max_far = self.legal_max;
        }
    }
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let args = Args::parse();
    let config = AppConfig::load().wrap_err("invalid configuration")?;

    init_tracing(args.verbose, args.is_headless(), config.general.log_file.as_deref())?;

    let mut file = match &args.file {
        Some(path) => load_project_file(path)?,
        None => ProjectFile {
            bertaud: config.defaults.parameters(),
            ..ProjectFile::default()
        },
    };
    file.bertaud
        .legal_max_far
        .get_or_insert(config.defaults.legal_max_far);
    args.apply_overrides(&mut file);

    let store = open_settings_store();
    let fallback = GraderSettings {
        provider: config.grading.provider,
        api_key: Some(config.grading.api_key.clone()).filter(|k| !k.is_empty()),
    };
    let mut settings = match &store {
        Some(store) => GraderSettings::load(store, &fallback).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "ignoring unreadable grader settings");
            fallback.clone()
        }),
        None => fallback.clone(),
    };
    if let Some(provider) = args.provider {
        settings.provider = provider;
    }

    let blueprint = args.blueprint.as_deref().map(Blueprint::open).transpose()?;

    if args.is_headless() {
        return run_headless(&args, &file, &config, &settings, blueprint.as_ref());
    }

    let mut app = App::new(file, config, settings);
    if let Some(store) = store {
        app = app.with_store(Box::new(store));
    }
    if let Some(blueprint) = blueprint {
        app = app.with_blueprint(blueprint);
    }

    let terminal = ratatui::init();
    let result = app.run(terminal);
    ratatui::restore();
    result
}

fn run_headless(
    args: &Args,
    file: &ProjectFile,
    config: &AppConfig,
    settings: &GraderSettings,
    blueprint: Option<&Blueprint>,
) -> Result<()> {
    let evaluation = evaluate_project(&file.project, &file.bertaud, &file.site, &config.finance)
        .wrap_err("evaluation failed")?;

    let grade = match blueprint {
        Some(blueprint) => {
            let grader = build_grader(settings, &config.grading)?;
            let context = GradingContext::new(&file.project, &evaluation);
            Some(
                grader
                    .grade(blueprint, &context)
                    .wrap_err_with(|| format!("grading with {} failed", grader.name()))?,
            )
        }
        None => None,
    };

    let data = ReportData::new(&file.project, &evaluation, grade.as_ref(), chrono::Local::now())
        .with_location(file.site.location);

    if let Some(json_path) = &args.json {
        let snapshot = EvaluationSnapshot {
            inputs: &file.project,
            evaluation: &evaluation,
            grade: grade.as_ref(),
        };
        export_json(&snapshot, json_path)?;
        println!("Exported to JSON: {}", json_path.display());
    }

    if let Some(csv_path) = &args.csv {
        export_csv(&data, csv_path)?;
        println!("Exported to CSV: {}", csv_path.display());
    }

    if let Some(report_path) = &args.report {
        export_report(&data, report_path)?;
        println!("Report written to: {}", report_path.display());
    }

    if let Some(map_path) = &args.map {
        let location = file
            .site
            .location
            .ok_or_else(|| eyre!("--map needs site.location in the project file"))?;
        export_map_html(location, &file.project.project_name, map_path)?;
        println!("Map written to: {}", map_path.display());
    }

    if args.print {
        print!("{}", render_report(&data));
    }

    Ok(())
}

fn parse_land_title(text: &str) -> Result<f64, String> {
    parse_title_deed_area(text)
        .ok_or_else(|| format!("expected rai-ngan-wah such as 2-1-50, got `{text}`"))
}

fn open_settings_store() -> Option<FileStore> {
    let path = FileStore::default_path()?;
    match FileStore::open(&path) {
        Ok(store) => Some(store),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "settings store unavailable");
            None
        }
    }
}

/// Logs go to stderr when headless. The dashboard owns the terminal, so
/// there they go to the configured file or nowhere.
fn init_tracing(verbose: bool, headless: bool, log_file: Option<&Path>) -> Result<()> {
    let level = if verbose { "debug" } else { "warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    let (writer, ansi) = match (headless, log_file) {
        (true, _) => (BoxMakeWriter::new(std::io::stderr), true),
        (false, Some(path)) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .wrap_err_with(|| format!("cannot open log file {}", path.display()))?;
            (BoxMakeWriter::new(std::sync::Mutex::new(file)), false)
        }
        (false, None) => (BoxMakeWriter::new(std::io::sink), false),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(ansi)
        .try_init()
        .map_err(|error| eyre!("failed to initialize tracing subscriber: {error}"))?;

    Ok(())
}


use crate::engine::bertaud::calibrate;
use crate::engine::distance_from_site;
use crate::error::LoadError;
use crate::model::{BertaudParameters, DensitySample, ProjectInputs, SiteContext};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A saved proposal: project numbers, model parameters and site context.
///
/// Every table is optional in the file; missing values fall back to the
/// defaults of each type. When loading, a file that gives the site and CBD
/// coordinates but no `distanceKm` gets the great-circle distance between
/// them, and `[[calibration]]` samples replace D₀ and g unless the file sets
/// either one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectFile {
    pub project: ProjectInputs,
    pub bertaud: BertaudParameters,
    pub site: SiteContext,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub calibration: Vec<DensitySample>,
}

/// Loads a project file, choosing TOML for `.toml` files and JSON otherwise.
///
/// # Errors
///
/// Returns [`LoadError::FileRead`] if the file cannot be read, or
/// [`LoadError::Json`] / [`LoadError::Toml`] if it does not describe a
/// project.
///
/// # Example
///
/// ```no_run
/// use land_audit::loader::load_project_file;
///
/// let file = load_project_file("site-42.toml")?;
/// println!("{}: {} rai", file.project.project_name, file.project.land_size_rai);
/// # Ok::<(), land_audit::error::LoadError>(())
/// ```
pub fn load_project_file<P: AsRef<Path>>(path: P) -> Result<ProjectFile, LoadError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|source| LoadError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;

    let is_toml = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));

    let file = if is_toml {
        parse_toml(&content)?
    } else {
        parse_json(&content)?
    };

    tracing::debug!(path = %path.display(), project = %file.project.project_name, "loaded project file");
    Ok(file)
}

/// `[bertaud]` keys the file states outright; derived values never
/// overwrite these.
#[derive(Debug, Clone, Copy)]
struct StatedParameters {
    d0: bool,
    g: bool,
    distance_km: bool,
}

impl StatedParameters {
    fn from_lookup(has: impl Fn(&str) -> bool) -> Self {
        Self {
            d0: has("d0"),
            g: has("g"),
            distance_km: has("distanceKm"),
        }
    }
}

pub fn parse_json(content: &str) -> Result<ProjectFile, LoadError> {
    let value: serde_json::Value = serde_json::from_str(content)?;
    let stated = StatedParameters::from_lookup(|key| {
        value.pointer(&format!("/bertaud/{key}")).is_some()
    });
    let file = serde_json::from_value(value)?;
    Ok(resolve_derived(file, stated))
}

pub fn parse_toml(content: &str) -> Result<ProjectFile, LoadError> {
    let table: toml::Table = toml::from_str(content)?;
    let stated = StatedParameters::from_lookup(|key| {
        table
            .get("bertaud")
            .and_then(|bertaud| bertaud.get(key))
            .is_some()
    });
    let file = toml::Value::Table(table).try_into()?;
    Ok(resolve_derived(file, stated))
}

fn resolve_derived(mut file: ProjectFile, stated: StatedParameters) -> ProjectFile {
    if !stated.d0 && !stated.g && !file.calibration.is_empty() {
        let samples: Vec<(f64, f64)> = file
            .calibration
            .iter()
            .map(|s| (s.distance_km, s.density))
            .collect();
        match calibrate(&samples) {
            Some((d0, g)) => {
                tracing::debug!(d0, g, samples = samples.len(), "calibrated density model");
                file.bertaud.d0 = d0;
                file.bertaud.g = g;
            }
            None => tracing::warn!(
                samples = samples.len(),
                "calibration samples unusable, keeping default D0 and g"
            ),
        }
    }

    if !stated.distance_km {
        if let Some(distance_km) = distance_from_site(&file.site) {
            tracing::debug!(distance_km, "distance to CBD taken from site coordinates");
            file.bertaud.distance_km = distance_km;
        }
    }
    file
}

use crate::error::ExportError;
use crate::model::{GradeReport, ProjectEvaluation, ProjectInputs};
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Snapshot written by the JSON export: what went in and what came out.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationSnapshot<'a> {
    pub inputs: &'a ProjectInputs,
    pub evaluation: &'a ProjectEvaluation,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grade: Option<&'a GradeReport>,
}

pub fn export_json<P: AsRef<Path>>(
    snapshot: &EvaluationSnapshot<'_>,
    path: P,
) -> Result<(), ExportError> {
    let path_ref = path.as_ref();
    let json = serde_json::to_string_pretty(snapshot)?;

    let mut file = File::create(path_ref).map_err(|source| ExportError::FileCreate {
        path: path_ref.to_path_buf(),
        source,
    })?;

    file.write_all(json.as_bytes())
        .map_err(|e| ExportError::WriteError {
            message: e.to_string(),
        })?;

    Ok(())
}

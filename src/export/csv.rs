use super::report::ReportData;
use crate::error::ExportError;
use std::fs::File;
use std::path::Path;

pub fn export_csv<P: AsRef<Path>>(data: &ReportData, path: P) -> Result<(), ExportError> {
    let path_ref = path.as_ref();
    let file = File::create(path_ref).map_err(|source| ExportError::FileCreate {
        path: path_ref.to_path_buf(),
        source,
    })?;

    let mut writer = csv::Writer::from_writer(file);

    writer.write_record(["Project", "Metric", "Value", "Status"])?;

    for [metric, value, status] in data.metric_rows() {
        writer.write_record([&data.project_name, &metric, &value, &status])?;
    }

    writer.flush().map_err(|e| ExportError::WriteError {
        message: e.to_string(),
    })?;

    Ok(())
}

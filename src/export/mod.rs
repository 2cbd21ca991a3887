pub mod csv;
pub mod json;
pub mod report;

pub use crate::error::ExportError;
pub use csv::export_csv;
pub use json::{export_json, EvaluationSnapshot};
pub use report::{export_report, render_report, ReportData};

//! Error types for land-audit.

use std::path::PathBuf;
use thiserror::Error;

/// Input guard failures of the FAR evaluator.
///
/// Each variant carries a stable code (see [`FarError::code`]) that is part
/// of the JSON error shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FarError {
    /// Land size is zero, negative or not a number.
    #[error("Land size must be greater than 0")]
    ZeroLandSize,

    /// Proposed gross floor area is negative or not a number.
    #[error("Proposed GFA cannot be negative")]
    ZeroGfa,

    /// Bertaud parameters are out of range.
    #[error("D0 must be positive, g and distance_km must be non-negative")]
    InvalidParams,
}

impl FarError {
    /// Stable machine-readable code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::ZeroLandSize => "ZERO_LAND_SIZE",
            Self::ZeroGfa => "ZERO_GFA",
            Self::InvalidParams => "INVALID_PARAMS",
        }
    }

    /// Message shown in Thai-language reports.
    #[must_use]
    pub const fn thai_message(self) -> &'static str {
        match self {
            Self::ZeroLandSize => "ขนาดที่ดินต้องมากกว่า 0",
            Self::ZeroGfa => "พื้นที่อาคารต้องไม่ติดลบ",
            Self::InvalidParams => "D₀ ต้องเป็นบวก, g และระยะทางต้องไม่ติดลบ",
        }
    }
}

/// Errors that can occur when loading a project file.
#[derive(Debug, Error)]
pub enum LoadError {
    /// Failed to read the project file from disk.
    #[error("failed to read file '{path}': {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The file is not valid JSON for a project.
    #[error("invalid project JSON: {source}")]
    Json {
        #[from]
        source: serde_json::Error,
    },

    /// The file is not valid TOML for a project.
    #[error("invalid project TOML: {source}")]
    Toml {
        #[from]
        source: toml::de::Error,
    },
}

/// Errors that can occur when exporting data.
#[derive(Debug, Error)]
pub enum ExportError {
    /// Failed to create the output file.
    #[error("failed to create file '{path}': {source}")]
    FileCreate {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to write data to the file.
    #[error("failed to write data: {message}")]
    WriteError { message: String },

    /// Failed to serialize data to JSON.
    #[error("JSON serialization failed: {source}")]
    JsonSerialize {
        #[from]
        source: serde_json::Error,
    },

    /// Failed to write CSV data.
    #[error("CSV write failed: {source}")]
    CsvWrite {
        #[from]
        source: csv::Error,
    },
}

/// Errors raised by blueprint graders.
#[derive(Debug, Error)]
pub enum GradingError {
    /// Failed to read the blueprint from disk.
    #[error("failed to read blueprint '{path}': {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The uploaded document is not a PDF.
    #[error("'{file_name}' is not a PDF document")]
    NotPdf { file_name: String },

    /// A hosted provider was selected without a credential.
    #[error("no API key configured for provider '{provider}'")]
    MissingApiKey { provider: String },

    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider returned a non-success status code.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The provider response could not be turned into a grade.
    #[error("could not read grading response: {0}")]
    Parse(String),
}

/// Errors from the key-value settings store.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// Reading or writing the settings file failed.
    #[error("settings file '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The settings file is not a JSON object of strings.
    #[error("settings file is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),

    /// A stored value could not be interpreted.
    #[error("invalid value for '{key}': {value}")]
    InvalidValue { key: String, value: String },
}

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Figment extraction or merge error.
    #[error("configuration error: {0}")]
    Figment(#[from] Box<figment::Error>),

    /// A configuration field has an invalid value.
    #[error("invalid configuration value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

impl From<figment::Error> for ConfigError {
    fn from(error: figment::Error) -> Self {
        Self::Figment(Box::new(error))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn far_error_codes_are_stable() {
        assert_eq!(FarError::ZeroLandSize.code(), "ZERO_LAND_SIZE");
        assert_eq!(FarError::ZeroGfa.code(), "ZERO_GFA");
        assert_eq!(FarError::InvalidParams.code(), "INVALID_PARAMS");
    }

    #[test]
    fn far_error_display_is_the_message() {
        assert_eq!(
            FarError::ZeroLandSize.to_string(),
            "Land size must be greater than 0"
        );
    }
}

//! Error types for the m2m conversion pipeline.
//!
//! - [`ConvertError`] - Metadata conversion errors raised while building or writing records
//! - [`CsvError`] - CSV reading errors
//! - [`ScriptError`] - Mapping file loading errors
//! - [`ConfigError`] - Invalid environment settings or logging setup
//! - [`PipelineError`] - Top-level orchestration errors
//!
//! The Display text of [`ConvertError`] is shown verbatim to operators,
//! so the wording of its variants is stable.

use std::path::PathBuf;

use thiserror::Error;

use crate::models::ElementKind;

// =============================================================================
// Conversion Errors
// =============================================================================

/// Errors raised while mapping values into a record or writing it out.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// Element type is neither `basic` nor `agent`.
    #[error("Unsupported mapping function type, {0}")]
    UnsupportedMappingType(String),

    /// A required value was empty after trimming.
    #[error("Value required for element named \"{0}\"")]
    RequiredValueMissing(String),

    /// Element name is not part of the schema.
    #[error("Element named \"{0}\" not in fieldTypes")]
    UnknownElement(String),

    /// Element exists but was mapped with the wrong kind.
    #[error(
        "Element \"{element}\" should be of {declared} type, but you are attempting to add it as \"{attempted}\" type."
    )]
    ElementKindMismatch {
        element: String,
        declared: ElementKind,
        attempted: ElementKind,
    },

    /// `location` used on an agent other than `publisher`.
    #[error("location can only be used on publisher element")]
    LocationNotAllowed,

    /// Output directory could not be created and does not exist.
    #[error("Unable to create the output directory {}. Perhaps you should check permissions?", path.display())]
    DirectoryCreationFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Text contains characters XML 1.0 cannot represent.
    #[error("Value for element named \"{0}\" contains characters not allowed in XML")]
    InvalidXmlCharacter(String),

    /// Selected row number has no matching row.
    #[error("Sorry, {0} is not a valid row number.")]
    RowIndexOutOfRange(usize),

    /// A write was requested before the record knew where to go.
    #[error("Record has no {0} set")]
    OutputLocationUnset(&'static str),

    /// File write failed.
    #[error("Failed to write file: {0}")]
    Io(#[from] std::io::Error),

    /// XML serialization failed.
    #[error("XML error: {0}")]
    Xml(String),

    /// JSON serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

// =============================================================================
// CSV Errors
// =============================================================================

/// Errors during CSV reading.
#[derive(Debug, Error)]
pub enum CsvError {
    /// Failed to read file.
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    /// Empty file.
    #[error("CSV file is empty")]
    EmptyFile,

    /// Malformed CSV content.
    #[error("Invalid CSV format: {0}")]
    ParseError(String),
}

impl From<csv::Error> for CsvError {
    fn from(err: csv::Error) -> Self {
        let line = err.position().map(|p| p.line());
        match line {
            Some(line) => CsvError::ParseError(format!("line {}: {}", line, err)),
            None => CsvError::ParseError(err.to_string()),
        }
    }
}

// =============================================================================
// Mapping Script Errors
// =============================================================================

/// Errors while loading a mapping file.
#[derive(Debug, Error)]
pub enum ScriptError {
    /// Failed to read the mapping file.
    #[error("Failed to read mapping file: {0}")]
    IoError(#[from] std::io::Error),

    /// Mapping file is not valid JSON for the script format.
    #[error("Invalid mapping JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Mapping file parsed but is not usable.
    #[error("Invalid mapping script: {0}")]
    InvalidScript(String),
}

// =============================================================================
// Configuration Errors
// =============================================================================

/// Invalid environment configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },

    #[error("Failed to initialize logging: {0}")]
    Logging(String),
}

// =============================================================================
// Pipeline Errors (top-level)
// =============================================================================

/// Top-level errors returned by [`crate::transform::pipeline::run`].
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Conversion error, shown to the operator unchanged.
    #[error(transparent)]
    Convert(#[from] ConvertError),

    /// CSV reading error.
    #[error("CSV error: {0}")]
    Csv(#[from] CsvError),

    /// Mapping script error.
    #[error("Mapping error: {0}")]
    Script(#[from] ScriptError),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Writing to the output stream failed.
    #[error("Output error: {0}")]
    Output(#[from] std::io::Error),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for conversion operations.
pub type ConvertResult<T> = Result<T, ConvertError>;

/// Result type for CSV operations.
pub type CsvResult<T> = Result<T, CsvError>;

/// Result type for mapping script operations.
pub type ScriptResult<T> = Result<T, ScriptError>;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversion_chain() {
        let csv_err = CsvError::EmptyFile;
        let pipeline_err: PipelineError = csv_err.into();
        assert!(pipeline_err.to_string().contains("empty"));

        let script_err = ScriptError::InvalidScript("no mappings".into());
        let pipeline_err: PipelineError = script_err.into();
        assert!(pipeline_err.to_string().contains("no mappings"));
    }

    #[test]
    fn test_convert_error_is_transparent() {
        let err: PipelineError = ConvertError::RowIndexOutOfRange(7).into();
        assert_eq!(err.to_string(), "Sorry, 7 is not a valid row number.");
    }

    #[test]
    fn test_kind_mismatch_format() {
        let err = ConvertError::ElementKindMismatch {
            element: "title".into(),
            declared: ElementKind::Basic,
            attempted: ElementKind::Agent,
        };
        assert_eq!(
            err.to_string(),
            "Element \"title\" should be of basic type, but you are attempting to add it as \"agent\" type."
        );
    }

    #[test]
    fn test_directory_error_format() {
        let err = ConvertError::DirectoryCreationFailed {
            path: PathBuf::from("out/folder"),
            source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        };
        assert_eq!(
            err.to_string(),
            "Unable to create the output directory out/folder. Perhaps you should check permissions?"
        );
    }
}

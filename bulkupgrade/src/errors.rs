//! Error types for bulk upgrade runs

use std::path::PathBuf;

use thiserror::Error;

/// Run-fatal errors. Any of these stops the run before (or instead of)
/// further row processing.
#[derive(Error, Debug)]
pub enum UpgradeError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("File not found: {}. Please provide the entire path", .0.display())]
    FileNotFound(PathBuf),

    #[error("Invalid CSV file format! CSV Header: {found:?} Expected Header: {expected:?}")]
    SchemaError {
        found: Vec<String>,
        expected: Vec<String>,
    },

    #[error("Could not retrieve {resource}: {reason}")]
    FetchError { resource: String, reason: String },

    #[error("Authentication error: {0}")]
    AuthError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("API error: {status} - {body}")]
    ApiError { status: u16, body: String },
}

impl UpgradeError {
    /// Wrap a collaborator failure as a catalog fetch failure for `resource`
    pub fn fetch(resource: impl Into<String>, err: UpgradeError) -> Self {
        UpgradeError::FetchError {
            resource: resource.into(),
            reason: err.to_string(),
        }
    }
}

/// Row-scoped failures. The row (or, for interfaces, the single value) is
/// skipped and processing continues with the next row.
///
/// The `Display` text is the outcome message reported for the row.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RowError {
    #[error("Device {serial_number} not found. Please check the Serial Number")]
    DeviceNotFound { serial_number: String },

    #[error("Image {version} is no longer supported. Please choose a different software image")]
    ImageUnsupported { version: String },

    #[error("Invalid Software Image {version}")]
    ImageInvalid { version: String },

    #[error("Interface {interface} not found on Device {serial_number}. Ignoring Interface settings for upgrade.")]
    InterfaceNotFound {
        interface: String,
        serial_number: String,
    },

    #[error("Invalid {field} value {value} for Device {serial_number}")]
    InvalidInterval {
        field: &'static str,
        value: String,
        serial_number: String,
    },

    #[error("Could not retrieve software status for Device {serial_number}")]
    StateFetch { serial_number: String },

    #[error("Device {serial_number} could not be upgraded to {version}")]
    StateUpdate {
        serial_number: String,
        version: String,
    },

    #[error("Could not abort upgrade for {serial_number}")]
    Abort { serial_number: String },
}

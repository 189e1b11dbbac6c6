//! Error types shared by the report pipeline.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failures raised while reading the sales CSV.
#[derive(Debug, Error)]
pub enum InputError {
    /// The configured input file does not exist.
    #[error("CSV file not found: {}", .0.display())]
    Missing(PathBuf),

    /// The input file exists but could not be read.
    #[error("failed to read CSV file {}: {source}", .path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The input file is larger than the configured limit.
    #[error("CSV file {} is {size} bytes, exceeding the {limit} byte limit", .path.display())]
    TooLarge { path: PathBuf, size: u64, limit: u64 },

    /// The input file does not carry an accepted extension.
    #[error("unsupported input file {}: only .csv files are accepted", .0.display())]
    UnsupportedExtension(PathBuf),

    /// The file is empty, so there is no header row to recognise.
    #[error("CSV file has no header row")]
    MissingHeader,

    /// None of the accepted spellings for a column appear in the header.
    #[error("CSV header has no {field} column (accepted: {accepted})")]
    MissingColumn {
        field: &'static str,
        accepted: String,
    },

    /// The CSV decoder failed on the header or on the byte stream itself.
    #[error("failed to parse CSV data: {0}")]
    Csv(#[from] csv::Error),
}

/// Top-level error for generating, listing and loading reports.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error(transparent)]
    Input(#[from] InputError),

    #[error("failed to render PDF report: {0}")]
    Render(#[from] genpdf::error::Error),

    #[error("failed to access report storage at {}: {source}", .path.display())]
    Storage {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("report not found: {0}")]
    NotFound(String),
}

impl ReportError {
    pub(crate) fn storage(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Storage {
            path: path.into(),
            source,
        }
    }
}

/// Invalid value found while building [`Settings`](crate::config::Settings).
#[derive(Debug, Error)]
#[error("invalid value {value:?} for {key}: {reason}")]
pub struct ConfigError {
    pub key: &'static str,
    pub value: String,
    pub reason: String,
}

pub type Result<T, E = ReportError> = std::result::Result<T, E>;

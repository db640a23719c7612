//! Error types for the dashquery service.

use std::error::Error as StdError;
use std::fmt;
use std::result;
use tonic::Status;

/// A specialized Result type for dashquery operations.
pub type Result<T> = result::Result<T, Error>;

/// The error type for dashquery operations.
///
/// An empty result set is not represented here; see
/// [`QueryOutcome::NoData`](crate::chart::QueryOutcome::NoData).
#[derive(Debug)]
pub enum Error {
    /// Component identifier is not a valid integer
    InvalidIdentifier(String),
    /// Request is missing a required field
    InvalidRequest(String),
    /// Chart kind string is not one of the known kinds
    UnsupportedChartKind(String),
    /// No registry entry or template for the component
    NotFound(String),
    /// Placeholder count does not fit the expected group size
    MalformedTemplate { placeholders: usize, group: usize },
    /// Ad-hoc query contains a denied keyword
    UnsafeQuery { keyword: &'static str },
    /// Time range could not be parsed
    Parse(String),
    /// Store failure or a row set that does not match the chart's columns
    Execution(String),
    /// Configuration errors
    Config(String),
    /// I/O errors
    Io(std::io::Error),
    /// Serialization/deserialization errors
    Serialization(String),
}

impl Error {
    /// HTTP status code used when the error is returned to a dashboard client.
    pub fn status_code(&self) -> u16 {
        match self {
            Error::InvalidIdentifier(_)
            | Error::InvalidRequest(_)
            | Error::UnsupportedChartKind(_)
            | Error::MalformedTemplate { .. }
            | Error::UnsafeQuery { .. }
            | Error::Parse(_) => 400,
            Error::NotFound(_) => 404,
            Error::Execution(_) | Error::Config(_) | Error::Io(_) | Error::Serialization(_) => 500,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidIdentifier(id) => write!(f, "Invalid component ID: {}", id),
            Error::InvalidRequest(msg) => write!(f, "Invalid request: {}", msg),
            Error::UnsupportedChartKind(kind) => write!(f, "Invalid queryType: {}", kind),
            Error::NotFound(msg) => write!(f, "{}", msg),
            Error::MalformedTemplate { placeholders, group } => write!(
                f,
                "invalid query string: {} placeholders is not a multiple of {}",
                placeholders, group
            ),
            Error::UnsafeQuery { keyword } => write!(f, "query contains invalid keyword: {}", keyword),
            Error::Parse(msg) => write!(f, "Parse error: {}", msg),
            Error::Execution(msg) => write!(f, "{}", msg),
            Error::Config(msg) => write!(f, "Configuration error: {}", msg),
            Error::Io(err) => write!(f, "I/O error: {}", err),
            Error::Serialization(msg) => write!(f, "Serialization error: {}", msg),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<config::ConfigError> for Error {
    fn from(err: config::ConfigError) -> Self {
        Error::Config(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

impl From<duckdb::Error> for Error {
    fn from(err: duckdb::Error) -> Self {
        Error::Execution(err.to_string())
    }
}

// Store failures cross the storage seam as Status; keep the message verbatim.
impl From<Status> for Error {
    fn from(status: Status) -> Self {
        Error::Execution(status.message().to_string())
    }
}

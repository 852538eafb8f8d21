//! Domain error types.

use serde::Serialize;
use std::fmt;

/// Top-level error type for algosphere.
#[derive(Debug, thiserror::Error)]
pub enum AlgoError {
    #[error("no price data for {ticker}")]
    NoData { ticker: String },

    #[error("price data for {ticker} is missing the {column} column")]
    MissingColumn { ticker: String, column: String },

    #[error("malformed price data for {ticker}: {reason}")]
    MalformedData { ticker: String, reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("unknown strategy type: {name}")]
    UnknownStrategy { name: String },

    #[error("model set {set} is unavailable: {reason}")]
    ArtifactUnavailable { set: String, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Failure classes a job runner sees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorKind {
    DataError,
    ConfigurationError,
    ArtifactUnavailable,
    Io,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::DataError => "DataError",
            ErrorKind::ConfigurationError => "ConfigurationError",
            ErrorKind::ArtifactUnavailable => "ArtifactUnavailable",
            ErrorKind::Io => "IoError",
        };
        f.write_str(name)
    }
}

impl AlgoError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AlgoError::NoData { .. }
            | AlgoError::MissingColumn { .. }
            | AlgoError::MalformedData { .. } => ErrorKind::DataError,
            AlgoError::ConfigParse { .. }
            | AlgoError::ConfigMissing { .. }
            | AlgoError::ConfigInvalid { .. }
            | AlgoError::UnknownStrategy { .. } => ErrorKind::ConfigurationError,
            AlgoError::ArtifactUnavailable { .. } => ErrorKind::ArtifactUnavailable,
            AlgoError::Io(_) => ErrorKind::Io,
        }
    }

    pub(crate) fn invalid(section: &str, key: &str, reason: impl Into<String>) -> Self {
        AlgoError::ConfigInvalid {
            section: section.to_string(),
            key: key.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn malformed(ticker: &str, reason: impl Into<String>) -> Self {
        AlgoError::MalformedData {
            ticker: ticker.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<ErrorKind> for std::process::ExitCode {
    fn from(kind: ErrorKind) -> Self {
        let code: u8 = match kind {
            ErrorKind::Io => 1,
            ErrorKind::ConfigurationError => 2,
            ErrorKind::ArtifactUnavailable => 3,
            ErrorKind::DataError => 5,
        };
        std::process::ExitCode::from(code)
    }
}

impl From<&AlgoError> for std::process::ExitCode {
    fn from(err: &AlgoError) -> Self {
        err.kind().into()
    }
}

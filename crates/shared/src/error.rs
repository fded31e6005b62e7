use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    LoadFailed,
    MissingColumn,
    NoActiveRow,
    InvalidLabel,
    SaveFailed,
    SettingsCorrupt,
    InvalidCategorySet,
}

/// Every failure the labeling core can report. All of them are recoverable:
/// the operation that produced one leaves the session and the settings file
/// in their last good state.
#[derive(Debug, Error)]
pub enum GraderError {
    #[error("failed to load dataset '{}': {source}", .path.display())]
    LoadFailed {
        path: PathBuf,
        #[source]
        source: BoxError,
    },
    #[error("column '{0}' is not present in the dataset")]
    MissingColumn(String),
    #[error("no row is currently active; draw a row first")]
    NoActiveRow,
    #[error("'{0}' is not one of the configured categories")]
    InvalidLabel(String),
    #[error("failed to save '{}': {source}", .path.display())]
    SaveFailed {
        path: PathBuf,
        #[source]
        source: BoxError,
    },
    #[error("settings file '{}' is corrupt: {reason}", .path.display())]
    SettingsCorrupt { path: PathBuf, reason: String },
    #[error("invalid category set: {0}")]
    InvalidCategorySet(String),
}

impl GraderError {
    pub fn load_failed(path: impl Into<PathBuf>, source: impl Into<BoxError>) -> Self {
        Self::LoadFailed {
            path: path.into(),
            source: source.into(),
        }
    }

    pub fn save_failed(path: impl Into<PathBuf>, source: impl Into<BoxError>) -> Self {
        Self::SaveFailed {
            path: path.into(),
            source: source.into(),
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            Self::LoadFailed { .. } => ErrorCode::LoadFailed,
            Self::MissingColumn(_) => ErrorCode::MissingColumn,
            Self::NoActiveRow => ErrorCode::NoActiveRow,
            Self::InvalidLabel(_) => ErrorCode::InvalidLabel,
            Self::SaveFailed { .. } => ErrorCode::SaveFailed,
            Self::SettingsCorrupt { .. } => ErrorCode::SettingsCorrupt,
            Self::InvalidCategorySet(_) => ErrorCode::InvalidCategorySet,
        }
    }

    /// Errors the operator fixes by choosing differently (another label,
    /// another column) rather than by touching files on disk.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self.code(),
            ErrorCode::MissingColumn
                | ErrorCode::NoActiveRow
                | ErrorCode::InvalidLabel
                | ErrorCode::InvalidCategorySet
        )
    }
}

pub type GraderResult<T> = Result<T, GraderError>;

/// Serializable snapshot of a [`GraderError`] for machine-readable output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorReport {
    pub code: ErrorCode,
    pub message: String,
}

impl ErrorReport {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl From<&GraderError> for ErrorReport {
    fn from(value: &GraderError) -> Self {
        Self {
            code: value.code(),
            message: value.to_string(),
        }
    }
}

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    TypeMismatch,
    UndeclaredKey,
    Decode,
    Listener,
    Persist,
    Validation,
    Internal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
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

/// Failure of a backend write or delete.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("store i/o failed for '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("store contents could not be serialized: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("backend rejected operation: {0}")]
    Rejected(String),
    #[error("value could not be encoded for storage: {0}")]
    Encode(#[from] CodecError),
}

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("failed to encode value: {0}")]
    Encode(String),
    #[error("failed to decode stored blob: {0}")]
    Decode(String),
}

#[derive(Debug, Error)]
pub enum PrefsError {
    #[error("preference '{key}' was previously declared as {declared}, not {requested}")]
    TypeMismatch {
        key: String,
        declared: &'static str,
        requested: &'static str,
    },
    #[error("cannot use preference '{key}' before it has been declared")]
    UndeclaredKey { key: String },
    #[error("couldn't load preference '{key}': {source}")]
    Decode {
        key: String,
        #[source]
        source: CodecError,
    },
    #[error("listener for preference '{key}' failed: {message}")]
    Listener { key: String, message: String },
    #[error("couldn't persist preference '{key}': {source}")]
    Persist {
        key: String,
        #[source]
        source: StorageError,
    },
}

impl PrefsError {
    pub fn code(&self) -> ErrorCode {
        match self {
            PrefsError::TypeMismatch { .. } => ErrorCode::TypeMismatch,
            PrefsError::UndeclaredKey { .. } => ErrorCode::UndeclaredKey,
            PrefsError::Decode { .. } => ErrorCode::Decode,
            PrefsError::Listener { .. } => ErrorCode::Listener,
            PrefsError::Persist { .. } => ErrorCode::Persist,
        }
    }

    pub fn key(&self) -> &str {
        match self {
            PrefsError::TypeMismatch { key, .. }
            | PrefsError::UndeclaredKey { key }
            | PrefsError::Decode { key, .. }
            | PrefsError::Listener { key, .. }
            | PrefsError::Persist { key, .. } => key,
        }
    }
}

impl From<&PrefsError> for ErrorReport {
    fn from(value: &PrefsError) -> Self {
        Self {
            code: value.code(),
            message: value.to_string(),
        }
    }
}

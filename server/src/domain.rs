use std::io;

use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Invalid file name: '{0}'")]
    InvalidFilename(String),

    #[error("Upload cannot be read: {reason}")]
    MalformedUpload { status: StatusCode, reason: String },

    #[error("Failed to upload file '{name}'")]
    StorageWriteFailure {
        name: String,
        #[source]
        source: io::Error,
    },

    #[error("File not found: '{0}'")]
    FileNotFound(String),

    #[error("Failed to read file '{name}'")]
    StorageReadFailure {
        name: String,
        #[source]
        source: io::Error,
    },
}

impl StorageError {
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            StorageError::InvalidFilename(_) => StatusCode::BAD_REQUEST,
            StorageError::MalformedUpload { status, .. } => *status,
            StorageError::StorageWriteFailure { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            // Download failures of any kind look like a missing file to the caller
            StorageError::FileNotFound(_) | StorageError::StorageReadFailure { .. } => {
                StatusCode::NOT_FOUND
            }
        }
    }
}

impl From<MultipartError> for StorageError {
    fn from(e: MultipartError) -> Self {
        StorageError::MalformedUpload {
            status: e.status(),
            reason: e.body_text(),
        }
    }
}

impl IntoResponse for StorageError {
    fn into_response(self) -> Response {
        match &self {
            StorageError::StorageWriteFailure { source, .. }
            | StorageError::StorageReadFailure { source, .. } => {
                tracing::error!("{self}. Error: {source}");
            }
            _ => tracing::error!("{self}"),
        }
        (self.status(), self.to_string()).into_response()
    }
}

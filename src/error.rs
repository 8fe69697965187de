use core_types::CoreError;
use database::DbError;
use std::io;
use thiserror::Error;

/// Everything that can end a single menu operation.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    Input(#[from] CoreError),
    #[error("{0}")]
    Database(#[from] DbError),
    #[error("Terminal I/O failed: {0}")]
    Io(#[from] io::Error),
    #[error("End of input.")]
    EndOfInput,
}

impl AppError {
    /// Records the failure in the log at a level matching its severity.
    pub fn log(&self, operation: &str) {
        match self {
            AppError::Input(e) => tracing::debug!(operation, error = %e, "Rejected input."),
            AppError::Database(e) if e.is_not_found() => {
                tracing::warn!(operation, error = %e, "Nothing matched.")
            }
            AppError::Database(e) => {
                tracing::error!(operation, error = ?e, "Operation failed and was rolled back.")
            }
            AppError::Io(e) => tracing::error!(operation, error = ?e, "Terminal I/O error."),
            AppError::EndOfInput => tracing::debug!(operation, "Input closed."),
        }
    }
}

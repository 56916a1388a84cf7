//! Error types for the reconcile crate

use thiserror::Error;

/// Errors raised by the reconciliation core
#[derive(Error, Debug)]
pub enum Error {
    /// A desired username has no remote identity
    #[error("user not found: {0}")]
    UserNotFound(String),

    /// A remote call failed
    #[error("{operation} failed for {subject}: {message}")]
    RemoteCall {
        operation: &'static str,
        subject: String,
        message: String,
    },
}

impl Error {
    pub fn remote_call(
        operation: &'static str,
        subject: impl Into<String>,
        source: anyhow::Error,
    ) -> Self {
        Self::RemoteCall {
            operation,
            subject: subject.into(),
            message: format!("{source:#}"),
        }
    }
}

/// Result type for reconcile operations
pub type Result<T> = std::result::Result<T, Error>;

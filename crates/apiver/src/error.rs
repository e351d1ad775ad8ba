//! Error types for apiver

use thiserror::Error;

/// Result type alias for apiver operations
pub type Result<T, E = VersioningError> = std::result::Result<T, E>;

/// Errors raised by configuration and construction calls
///
/// These are programmer errors: they surface while wiring the application,
/// never while serving a request. A request carrying an unsupported version is
/// answered with a 400 response instead.
#[derive(Debug, Error)]
pub enum VersioningError {
    /// A required argument was missing or empty
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A route could not be mounted on the host router
    #[error(transparent)]
    Mount(#[from] apiver_core::MountError),

    /// Settings could not be read from the environment
    #[cfg(feature = "config")]
    #[error("configuration error: {0}")]
    Config(#[from] envy::Error),
}

impl VersioningError {
    pub(crate) fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    /// Whether this is an [`VersioningError::InvalidArgument`]
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument(_))
    }
}

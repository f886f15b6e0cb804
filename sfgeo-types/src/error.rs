//! Error type used by the crate.

use thiserror::Error;

/// Error enum.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SfGeoError {
    /// A geometry could not be constructed because it violates one of the invariants of its type.
    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),
}

impl SfGeoError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        let message = message.into();
        log::debug!("Rejected geometry: {message}");
        Self::InvalidGeometry(message)
    }
}

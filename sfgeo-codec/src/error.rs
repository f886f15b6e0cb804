use sfgeo_types::error::SfGeoError;
use thiserror::Error;

/// Error returned by the WKT and WKB parsers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// The input is malformed or is not accepted by the parser configuration.
    #[error("parse error: {0}")]
    Parse(String),

    /// The input is well-formed, but describes a geometry the factory refused to create.
    #[error(transparent)]
    InvalidGeometry(#[from] SfGeoError),
}

impl CodecError {
    pub(crate) fn parse(message: impl Into<String>) -> Self {
        Self::Parse(message.into())
    }
}

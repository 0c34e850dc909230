/// Convenience result type used across framewise.
pub type FramewiseResult<T> = Result<T, FramewiseError>;

/// Top-level error taxonomy used by the composition APIs.
#[derive(thiserror::Error, Debug)]
pub enum FramewiseError {
    /// Invalid spring, interpolation, sequence, audio or composition data. Raised when a value is
    /// constructed, deserialized or registered; never at render time.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Unknown composition id or a frame outside a composition's duration.
    #[error("lookup error: {0}")]
    Lookup(String),

    /// Failure reported by an [`AssetLocator`](crate::AssetLocator).
    #[error("asset error: {0}")]
    Asset(String),

    /// Errors when serializing or deserializing documents.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl FramewiseError {
    /// Build a [`FramewiseError::Configuration`] value.
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Build a [`FramewiseError::Lookup`] value.
    pub fn lookup(msg: impl Into<String>) -> Self {
        Self::Lookup(msg.into())
    }

    /// Build a [`FramewiseError::Asset`] value.
    pub fn asset(msg: impl Into<String>) -> Self {
        Self::Asset(msg.into())
    }

    /// Build a [`FramewiseError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;

use thiserror::Error;

/// Errors produced by the load pipeline.
///
/// `Fetch` and `Decode` put the control into the failed visual state with a
/// reload affordance; `UnsupportedScheme` is a configuration error surfaced
/// before any pipeline work starts and is never retried automatically.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum LoadError {
    #[error("fetch failed: {0}")]
    Fetch(String),

    #[error("decode failed: {0}")]
    Decode(String),

    #[error("unsupported uri scheme: {0}")]
    UnsupportedScheme(String),
}

impl LoadError {
    /// True for errors that indicate a misconfigured control rather than a
    /// transient fetch/decode failure.
    pub fn is_configuration(&self) -> bool {
        matches!(self, LoadError::UnsupportedScheme(_))
    }
}

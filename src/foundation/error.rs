/// Convenience result type used across the crate.
pub type SunflowerResult<T> = Result<T, SunflowerError>;

/// Top-level error taxonomy used by engine APIs.
#[derive(thiserror::Error, Debug)]
pub enum SunflowerError {
    /// Invalid configuration, canvas, or other caller-provided data.
    #[error("validation error: {0}")]
    Validation(String),

    /// A required bitmap is missing, undecodable, or has no pixels.
    #[error("asset error: {0}")]
    Asset(String),

    /// Errors while evaluating animation state for a tick.
    #[error("evaluation error: {0}")]
    Evaluation(String),

    /// Errors raised by a draw surface or frame sink.
    #[error("render error: {0}")]
    Render(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SunflowerError {
    /// Build a [`SunflowerError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`SunflowerError::Asset`] value.
    pub fn asset(msg: impl Into<String>) -> Self {
        Self::Asset(msg.into())
    }

    /// Build a [`SunflowerError::Evaluation`] value.
    pub fn evaluation(msg: impl Into<String>) -> Self {
        Self::Evaluation(msg.into())
    }

    /// Build a [`SunflowerError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`SunflowerError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;

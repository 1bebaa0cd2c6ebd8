//! Error types for the persona engine.

use howl_core::HowlError;
use howl_llm::LlmError;
use thiserror::Error;

/// Everything that can go wrong while assembling context or acting.
#[derive(Error, Debug)]
pub enum PersonaError {
    /// Core failure: unknown action, message source, configuration.
    #[error(transparent)]
    Core(#[from] HowlError),

    /// Generation backend failure.
    #[error(transparent)]
    Generation(#[from] LlmError),

    /// The mood rating reply held no integer.
    #[error("Unparseable mood rating: {0:?}")]
    UnparseableMood(String),
}

/// Convenience Result type alias.
pub type Result<T> = std::result::Result<T, PersonaError>;

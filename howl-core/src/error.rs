//! Error types for the HOWL core library.

use thiserror::Error;

/// Top-level error type for all HOWL core operations.
#[derive(Error, Debug)]
pub enum HowlError {
    /// A need name did not match any known counter.
    #[error("Unknown need: {0}")]
    UnknownNeed(String),

    /// An action name did not match any known stimulus.
    #[error("Unknown action: {0}")]
    UnknownAction(String),

    /// A catalog was configured with no items to draw from.
    #[error("Catalog is empty: {0}")]
    EmptyCatalog(String),

    /// The chat platform failed to hand back a message window.
    #[error("Message source error for scope {scope}: {reason}")]
    MessageSource {
        /// Channel / scope that was being fetched.
        scope: String,
        /// What went wrong.
        reason: String,
    },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience Result type alias.
pub type Result<T> = std::result::Result<T, HowlError>;

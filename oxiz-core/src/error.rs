//! Error types for the OxiZ nonlinear arithmetic engine.
//!
//! The variants follow the engine's error taxonomy:
//! - soft interruptions ([`OxizError::Timeout`], [`OxizError::Cancelled`]) that a
//!   session converts into an "unknown" status,
//! - configuration problems rejected before any heuristic runs,
//! - fatal internal-consistency failures that must never be masked.

use thiserror::Error;

/// Result type used throughout the workspace.
pub type Result<T> = std::result::Result<T, OxizError>;

/// Errors raised by the engine and the surrounding session.
#[derive(Error, Debug)]
pub enum OxizError {
    /// The session's time budget was exhausted.
    #[error("timeout exceeded")]
    Timeout,

    /// The cooperative cancellation flag was raised.
    #[error("canceled")]
    Cancelled,

    /// An option value was rejected at construction time.
    #[error("invalid value for option '{module}.{option}': {message}")]
    Config {
        /// Module the option belongs to (`solver`, `nla`, ...).
        module: String,
        /// Option name.
        option: String,
        /// What was wrong with it.
        message: String,
    },

    /// The proof certificate did not validate.
    #[error("proof validation failed: {0}")]
    ProofValidation(String),

    /// A heuristic hit a malformed polynomial or broken invariant.
    #[error("internal error: {0}")]
    Internal(String),

    /// A variable needed by a heuristic has no value in the current model.
    #[error("no value for variable x{var} in the current model")]
    MissingValue {
        /// The variable without a value.
        var: u32,
    },

    /// I/O failure in one of the file sinks.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization failure while writing a backup artifact.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// An error annotated with where it happened.
    #[error("{context}: {source}")]
    Context {
        /// Description of the operation that failed.
        context: String,
        /// The underlying error.
        #[source]
        source: Box<OxizError>,
    },
}

impl OxizError {
    /// Build a configuration error.
    pub fn config(
        module: impl Into<String>,
        option: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Config {
            module: module.into(),
            option: option.into(),
            message: message.into(),
        }
    }

    /// Build an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Strip any context wrappers.
    pub fn root(&self) -> &OxizError {
        match self {
            Self::Context { source, .. } => source.root(),
            other => other,
        }
    }

    /// Whether this is a timeout or cancellation, i.e. recoverable at session level.
    pub fn is_interrupt(&self) -> bool {
        matches!(self.root(), Self::Timeout | Self::Cancelled)
    }

    /// Whether the error signals unsoundness or an internal bug.
    ///
    /// Fatal errors must propagate to the caller unchanged; they are never
    /// turned into an ordinary solver status.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self.root(),
            Self::ProofValidation(_) | Self::Internal(_) | Self::MissingValue { .. }
        )
    }
}

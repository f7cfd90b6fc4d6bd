//! Error context helpers.
//!
//! Provides `anyhow`-style context chaining on top of [`OxizError`], so that
//! a failing file sink reports which sink and path it was writing.

use crate::error::OxizError;

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error.
    fn context(self, context: impl Into<String>) -> Result<T, OxizError>;

    /// Add context with a lazy closure (only evaluated on error).
    fn with_context<F>(self, f: F) -> Result<T, OxizError>
    where
        F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
    E: Into<OxizError>,
{
    fn context(self, context: impl Into<String>) -> Result<T, OxizError> {
        self.map_err(|e| OxizError::Context {
            context: context.into(),
            source: Box::new(e.into()),
        })
    }

    fn with_context<F>(self, f: F) -> Result<T, OxizError>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| OxizError::Context {
            context: f(),
            source: Box::new(e.into()),
        })
    }
}

/// Collect the chain of context messages, outermost first.
pub fn context_chain(err: &OxizError) -> Vec<&str> {
    let mut chain = Vec::new();
    let mut current = err;
    while let OxizError::Context { context, source } = current {
        chain.push(context.as_str());
        current = source;
    }
    chain
}

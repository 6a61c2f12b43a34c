//! Error conversion helpers for common I/O operations
//!
//! Provides extension traits for cleaner error handling with path context.

use std::io;
use std::path::Path;

use crate::application::{ApplicationError, ApplicationResult};

/// Extension trait for converting `io::Result` to `ApplicationResult` with context.
pub trait IoResultExt<T> {
    /// Add path context to an I/O error.
    ///
    /// # Example
    /// ```ignore
    /// fs.read_to_string(&input)
    ///     .with_path_context("read input", &input)?;
    /// ```
    fn with_path_context(self, action: &str, path: &Path) -> ApplicationResult<T>;
}

impl<T> IoResultExt<T> for io::Result<T> {
    fn with_path_context(self, action: &str, path: &Path) -> ApplicationResult<T> {
        self.map_err(|e| ApplicationError::OperationFailed {
            context: format!("{}: {}", action, path.display()),
            source: Box::new(e),
        })
    }
}

/// Extension trait attaching context to `csv` and `serde_json` failures.
pub trait FormatResultExt<T> {
    fn with_format_context(self, context: &str) -> ApplicationResult<T>;
}

impl<T> FormatResultExt<T> for Result<T, csv::Error> {
    fn with_format_context(self, context: &str) -> ApplicationResult<T> {
        self.map_err(|source| ApplicationError::Csv {
            context: context.to_string(),
            source,
        })
    }
}

impl<T> FormatResultExt<T> for Result<T, serde_json::Error> {
    fn with_format_context(self, context: &str) -> ApplicationResult<T> {
        self.map_err(|source| ApplicationError::Json {
            context: context.to_string(),
            source,
        })
    }
}

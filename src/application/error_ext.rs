//! Error conversion helpers for store and file I/O
//!
//! Provides extension traits for cleaner error handling with context.

use std::io;
use std::path::Path;

use crate::application::{ApplicationError, ApplicationResult};

/// Extension trait for converting `io::Result` to `ApplicationResult` with context.
pub trait IoResultExt<T> {
    /// Add path context to an I/O error.
    ///
    /// # Example
    /// ```ignore
    /// fs.read_to_string(&path)
    ///     .with_path_context("read catalog", &path)?;
    /// ```
    fn with_path_context(self, action: &str, path: &Path) -> ApplicationResult<T>;

    /// Add a free-form context to an I/O error.
    fn with_context(self, context: impl Into<String>) -> ApplicationResult<T>;
}

impl<T> IoResultExt<T> for io::Result<T> {
    fn with_path_context(self, action: &str, path: &Path) -> ApplicationResult<T> {
        self.map_err(|e| ApplicationError::OperationFailed {
            context: format!("{}: {}", action, path.display()),
            source: Box::new(e),
        })
    }

    fn with_context(self, context: impl Into<String>) -> ApplicationResult<T> {
        self.map_err(|e| ApplicationError::OperationFailed {
            context: context.into(),
            source: Box::new(e),
        })
    }
}

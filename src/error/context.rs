//! Context attachment trait and implementations.

use crate::error::{Error, Result};
use std::fmt;

/// Extension trait for ergonomic error context attachment.
///
/// Works with both `Result<T, E>` (for any `E: Into<Error>`) and
/// `Option<T>`.
///
/// - Use `context()` when you have a static context message
/// - Use `with_context()` when the context message is expensive to
///   compute (it is only evaluated on error)
///
/// # Examples
///
/// ```rust
/// use reqflow::error::{Error, Result, ContextExt};
///
/// fn admit(host: &str) -> Result<()> {
///     check_host(host)
///         .with_context(|| format!("Admission check failed for {host}"))
/// }
/// # fn check_host(_: &str) -> Result<()> { Ok(()) }
/// ```
pub trait ContextExt<T, E> {
    /// Adds context to an error.
    fn context<C>(self, context: C) -> Result<T>
    where
        C: fmt::Display + Send + Sync + 'static;

    /// Adds lazy context to an error (only evaluated on error).
    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: fmt::Display + Send + Sync + 'static,
        F: FnOnce() -> C;
}

impl<T, E> ContextExt<T, E> for std::result::Result<T, E>
where
    E: Into<Error>,
{
    fn context<C>(self, context: C) -> Result<T>
    where
        C: fmt::Display + Send + Sync + 'static,
    {
        self.map_err(|e| e.into().context(context.to_string()))
    }

    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: fmt::Display + Send + Sync + 'static,
        F: FnOnce() -> C,
    {
        self.map_err(|e| e.into().context(f().to_string()))
    }
}

impl<T> ContextExt<T, Error> for Option<T> {
    fn context<C>(self, context: C) -> Result<T>
    where
        C: fmt::Display + Send + Sync + 'static,
    {
        self.ok_or_else(|| Error::invalid_request(context.to_string()))
    }

    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: fmt::Display + Send + Sync + 'static,
        F: FnOnce() -> C,
    {
        self.ok_or_else(|| Error::invalid_request(f().to_string()))
    }
}

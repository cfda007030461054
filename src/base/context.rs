//! Ergonomic error context helpers.
//!
//! Converts allocation failures reported by the fallible `try_reserve`
//! family into [`NetError::OutOfMemory`].

use crate::base::neterror::NetError;
use std::collections::TryReserveError;

/// Extension trait for allocation Results.
pub trait AllocResultExt<T> {
    /// Map an allocation failure to `NetError::OutOfMemory`, logging what
    /// was being allocated.
    ///
    /// # Example
    /// ```ignore
    /// use cookiegate::base::context::AllocResultExt;
    ///
    /// params.try_reserve(count).alloc_context("cookie parameters")?;
    /// ```
    fn alloc_context(self, what: &str) -> Result<T, NetError>;
}

impl<T> AllocResultExt<T> for Result<T, TryReserveError> {
    fn alloc_context(self, what: &str) -> Result<T, NetError> {
        self.map_err(|e| {
            tracing::error!(what = what, error = %e, "allocation failed");
            NetError::OutOfMemory
        })
    }
}

/// Reserve room for `additional` more elements, failing with
/// `NetError::OutOfMemory` instead of aborting.
pub fn reserve<T>(vec: &mut Vec<T>, additional: usize, what: &str) -> Result<(), NetError> {
    vec.try_reserve(additional).alloc_context(what)
}

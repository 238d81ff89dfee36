//! Result and Option helpers for node responses
//!
//! Balance reads collapse failures into a default while keeping a log trail.
//! Node payload fields that must be present map to `MissingField`.

use crate::core::errors::VaultError;

pub trait ResultExt<T> {
    /// Return the value, or log the failure at `warn` and return `default`.
    fn unwrap_or_log(self, default: T, context: &str) -> T;
}

impl<T> ResultExt<T> for Result<T, VaultError> {
    fn unwrap_or_log(self, default: T, context: &str) -> T {
        match self {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(error = %e, retryable = e.is_retryable(), "{} failed, using default", context);
                default
            }
        }
    }
}

pub trait OptionExt<T> {
    /// Require a field of a node response, naming it in the error.
    fn required(self, field: &str) -> Result<T, VaultError>;
}

impl<T> OptionExt<T> for Option<T> {
    fn required(self, field: &str) -> Result<T, VaultError> {
        self.ok_or_else(|| {
            tracing::error!(field, "node response is missing a required field");
            VaultError::MissingField(field.to_string())
        })
    }
}

//! Error types for wide-event tree operations.
//!
//! Core accumulator operations never surface recoverable errors to callers:
//! instrumentation must not be able to fail the instrumented code path. The
//! variants here cover the explicit, opt-in fallible surface (`try_set`,
//! typed value conversions).

use thiserror::Error;

/// Structured error types for wide-event tree operations.
#[non_exhaustive]
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EventError {
    /// A typed conversion was attempted on a value of a different kind
    #[error("type mismatch: expected {expected}, found {actual}")]
    TypeMismatch {
        expected: &'static str,
        actual: &'static str,
    },

    /// A key normalized to zero path segments and addresses nothing
    #[error("key {key:?} normalizes to an empty path")]
    EmptyPath { key: String },
}

impl EventError {
    /// Check if this error is a typed conversion failure
    pub fn is_type_mismatch(&self) -> bool {
        matches!(self, EventError::TypeMismatch { .. })
    }

    /// Check if this error is a degenerate-key failure
    pub fn is_empty_path(&self) -> bool {
        matches!(self, EventError::EmptyPath { .. })
    }
}

//!
//! Widelog: a canonical logging context for constructing wide events.
//!
//! A wide event (also called a canonical log line) is one structured JSON
//! record per unit of work capturing everything relevant to it, as an
//! alternative to scattering the same information across separate metrics,
//! logs, and traces. This crate provides the accumulator for building such
//! records: an insertion-ordered, hierarchical key-value tree addressed by
//! dot-separated keys, shared across the call graph through a cloneable
//! carrier handle, and rendered as a single nested JSON object at the end
//! of the unit of work.
//!
//! ## Core Concepts
//!
//! * **Fields ([`event::Fields`])**: the ordered tree a wide event
//!   accumulates into. Dotted keys create one nesting level per segment;
//!   keys are case-insensitive; iteration and JSON output follow
//!   first-insertion order.
//! * **Values ([`event::Value`])**: the closed union of what a slot can
//!   hold — text, integer, float, or a nested field group.
//! * **Carrier ([`LogContext`])**: the handle threaded through the call
//!   graph. Clones share one store; `init` attaches it idempotently; every
//!   accessor on an uninitialized carrier is a silent no-op, because
//!   instrumentation must never fail the instrumented path.
//! * **Middleware ([`CanonicalLogLayer`])**: a tower layer that populates
//!   the standard `http.request.*` / `http.response.*` fields and hands the
//!   rendered record to a sink once per request.
//!
//! ```
//! use widelog::LogContext;
//!
//! // Initialize the logging context at the start of the unit of work.
//! let ctx = LogContext::new().init();
//!
//! // Any holder of a clone annotates the same record.
//! ctx.set_string("http.request.method", "GET");
//! ctx.set_string("http.request.path", "/example");
//! ctx.set_int("http.response.status_code", 200);
//! ctx.add_float("db.duration_ms", 12.5);
//! ctx.add_float("db.duration_ms", 3.25);
//!
//! // Render once at the end and hand the line to your logger.
//! let line = ctx.to_json_string();
//! assert_eq!(
//!     line,
//!     r#"{"http":{"request":{"method":"GET","path":"/example"},"response":{"status_code":200}},"db":{"duration_ms":15.75}}"#
//! );
//! ```

pub mod context;
pub mod event;
pub mod middleware;

pub use context::LogContext;
pub use event::{Fields, KeyPath, Value};
pub use middleware::{CanonicalLog, CanonicalLogLayer};

/// Result type used throughout the widelog library.
pub type Result<T> = std::result::Result<T, Error>;

/// Common error type for the widelog library.
///
/// Core accumulation never returns this: missing contexts and mismatched
/// accumulator kinds degrade silently by design. It covers the explicit
/// fallible surface (strict JSON rendering, typed conversions, `try_set`).
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// Structured event-tree errors from the event module
    #[error(transparent)]
    Event(event::EventError),

    /// JSON rendering failed
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl Error {
    /// Get the originating module for this error.
    pub fn module(&self) -> &'static str {
        match self {
            Error::Event(_) => "event",
            Error::Serialize(_) => "serialize",
        }
    }
}

impl From<event::EventError> for Error {
    fn from(err: event::EventError) -> Self {
        Error::Event(err)
    }
}

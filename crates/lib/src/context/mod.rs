//! The carrier handle for per-unit-of-work accumulation.
//!
//! [`LogContext`] is the handle threaded through a call graph so that any
//! code touching one unit of work (one HTTP request, one background job)
//! can annotate the same wide event without explicit field plumbing. The
//! handle is cheap to clone; clones share one underlying store, which is
//! exactly what lets a request handler and the tasks it spawns accumulate
//! into the same record.
//!
//! The lifecycle mirrors the unit of work: [`LogContext::init`] attaches a
//! fresh store at the top of the work (idempotently, so every middleware
//! layer may call it), anything holding a clone mutates it along the way,
//! and the owner renders it once at the end with
//! [`LogContext::to_json_string`].
//!
//! A handle with no attached store is inert: every setter is a silent
//! no-op and rendering yields `""`. Instrumentation must never be able to
//! fail the code path it observes, so there is no "context missing" error.
//!
//! Known limitation: there is no fork operation. A clone always shares
//! the store with its parent; an isolated sub-context that does not write
//! back requires constructing a separate `LogContext`.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::event::Fields;

/// A cloneable carrier for one unit of work's wide event.
///
/// # Examples
///
/// ```
/// use widelog::LogContext;
///
/// let ctx = LogContext::new().init();
///
/// ctx.set_string("http.request.method", "GET");
/// ctx.set_int("http.response.status_code", 200);
/// ctx.add_int("db.queries", 1);
/// ctx.add_int("db.queries", 1);
///
/// assert_eq!(
///     ctx.to_json_string(),
///     r#"{"http":{"request":{"method":"GET"},"response":{"status_code":200}},"db":{"queries":2}}"#
/// );
/// ```
#[derive(Debug, Clone, Default)]
pub struct LogContext {
    store: Option<Arc<Store>>,
}

/// Shared storage behind every clone of an initialized carrier.
///
/// One coarse lock guards each whole path-walk-and-mutate; the operations
/// are in-memory O(depth) walks, so contention is bounded by tree depth,
/// not I/O.
#[derive(Debug, Default)]
struct Store {
    fields: Mutex<Fields>,
}

impl Store {
    fn lock(&self) -> MutexGuard<'_, Fields> {
        // A panic while holding the lock must not disable logging for the
        // rest of the unit of work.
        self.fields.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl LogContext {
    /// Creates a carrier with no attached store.
    ///
    /// Accessors on it are silent no-ops until [`init`](LogContext::init)
    /// attaches a store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attaches a store if absent, returning the initialized carrier.
    ///
    /// Idempotent along a lineage: if this carrier already has a store, the
    /// returned carrier shares it and nothing is reset. Call this at the
    /// start of each unit of work; extra calls further down the chain are
    /// harmless.
    #[must_use]
    pub fn init(&self) -> Self {
        Self {
            store: Some(match &self.store {
                Some(store) => Arc::clone(store),
                None => Arc::new(Store::default()),
            }),
        }
    }

    /// Returns true if a store is attached
    pub fn is_initialized(&self) -> bool {
        self.store.is_some()
    }

    /// Sets a string value, overwriting any previous value at the key.
    pub fn set_string(&self, key: &str, value: impl Into<String>) {
        self.with_fields(|fields| {
            fields.set(key, value.into());
        });
    }

    /// Sets an integer value, overwriting any previous value at the key.
    pub fn set_int(&self, key: &str, value: i64) {
        self.with_fields(|fields| {
            fields.set(key, value);
        });
    }

    /// Sets a float value, overwriting any previous value at the key.
    pub fn set_float(&self, key: &str, value: f64) {
        self.with_fields(|fields| {
            fields.set(key, value);
        });
    }

    /// Adds an integer delta to the key, initializing an absent leaf to the
    /// delta. A leaf of a different kind is left untouched.
    pub fn add_int(&self, key: &str, delta: i64) {
        self.with_fields(|fields| fields.add_int(key, delta));
    }

    /// Adds a float delta to the key, initializing an absent leaf to the
    /// delta. A leaf of a different kind is left untouched.
    pub fn add_float(&self, key: &str, delta: f64) {
        self.with_fields(|fields| fields.add_float(key, delta));
    }

    /// Renders the accumulated wide event as one JSON object.
    ///
    /// Returns `""` when no store is attached. The render happens under the
    /// same lock as mutation, so concurrent writers never produce a torn
    /// snapshot.
    pub fn to_json_string(&self) -> String {
        match &self.store {
            Some(store) => store.lock().to_json_string(),
            None => String::new(),
        }
    }

    /// Clones the current field tree, or `None` when uninitialized.
    ///
    /// Useful for inspecting accumulated state without rendering.
    pub fn snapshot(&self) -> Option<Fields> {
        self.store.as_ref().map(|store| store.lock().clone())
    }

    fn with_fields(&self, mutate: impl FnOnce(&mut Fields)) {
        if let Some(store) = &self.store {
            mutate(&mut store.lock());
        }
    }
}

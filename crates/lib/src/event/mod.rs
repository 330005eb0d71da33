//! The wide-event field tree.
//!
//! A wide event is one JSON object per unit of work. This module provides
//! the tree it accumulates into: [`Fields`], an insertion-ordered mapping
//! from normalized key segments to [`Value`]s, where a dotted key like
//! `http.request.method` creates one nested level per segment.
//!
//! Ordering is load-bearing: iteration (and therefore JSON output) follows
//! first-insertion order at every level, and overwriting a key keeps its
//! original position. That is what makes golden-output tests reproducible.
//!
//! `Fields` itself is a plain single-threaded value, like any other map.
//! Concurrent accumulation across tasks goes through
//! [`LogContext`](crate::context::LogContext), which wraps one `Fields` in
//! a lock.

use std::fmt;

use indexmap::{IndexMap, map::Entry};

// Submodules
mod errors;
mod path;
mod value;

pub use errors::EventError;
pub use path::KeyPath;
pub use value::Value;

/// An insertion-ordered mapping from field name to [`Value`].
///
/// Keys are case-insensitive: every mutation and lookup normalizes its key
/// through [`KeyPath`] first, so `Foo.Bar` and `foo.bar` address the same
/// slot. Dotted keys descend the tree, creating intermediate maps lazily.
///
/// # Examples
///
/// ```
/// use widelog::event::Fields;
///
/// let mut fields = Fields::new();
/// fields.set("http.request.method", "GET");
/// fields.set("http.request.path", "/example");
/// fields.set("http.response.status_code", 200);
///
/// assert_eq!(
///     fields.to_json_string(),
///     r#"{"http":{"request":{"method":"GET","path":"/example"},"response":{"status_code":200}}}"#
/// );
/// ```
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct Fields {
    entries: IndexMap<String, Value>,
}

impl Fields {
    /// Creates an empty field tree
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of direct keys at this level
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if this level holds no fields
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns true if the (normalized, possibly dotted) key resolves to a value
    pub fn contains_key(&self, key: impl AsRef<str>) -> bool {
        self.get(key).is_some()
    }

    /// Gets a value by key, descending through dotted segments.
    ///
    /// Returns `None` if any intermediate segment is missing or holds a
    /// scalar, or if the key normalizes to an empty path.
    pub fn get(&self, key: impl AsRef<str>) -> Option<&Value> {
        let path = KeyPath::parse(key);
        let (leaf, parents) = path.segments().split_last()?;
        let mut current = self;
        for segment in parents {
            current = current.entries.get(segment.as_str())?.as_map()?;
        }
        current.entries.get(leaf.as_str())
    }

    /// Gets a value by key with typed conversion.
    ///
    /// Returns `None` if the key doesn't resolve or the stored kind doesn't
    /// match the requested type.
    ///
    /// ```
    /// use widelog::event::Fields;
    ///
    /// let mut fields = Fields::new();
    /// fields.set("user.name", "Alice");
    /// fields.set("user.age", 30);
    ///
    /// assert_eq!(fields.get_as::<&str>("user.name"), Some("Alice"));
    /// assert_eq!(fields.get_as::<i64>("user.age"), Some(30));
    /// assert_eq!(fields.get_as::<i64>("user.name"), None);
    /// ```
    pub fn get_as<'a, T>(&'a self, key: impl AsRef<str>) -> Option<T>
    where
        T: TryFrom<&'a Value, Error = EventError>,
    {
        let value = self.get(key)?;
        T::try_from(value).ok()
    }

    /// Sets a value at the given key, returning the previous value if any.
    ///
    /// Intermediate maps are created lazily. An intermediate segment that
    /// holds a scalar is overwritten with a fresh map, so set always
    /// succeeds. An existing leaf keeps its position in iteration order.
    /// Keys that normalize to an empty path are ignored; use [`try_set`]
    /// to surface that case.
    ///
    /// [`try_set`]: Fields::try_set
    pub fn set(&mut self, key: impl AsRef<str>, value: impl Into<Value>) -> Option<Value> {
        let path = KeyPath::parse(key);
        let (leaf, parents) = path.segments().split_last()?;
        let target = self.descend(parents);
        target.entries.insert(leaf.clone(), value.into())
    }

    /// Sets a value at the given key, rejecting degenerate keys.
    ///
    /// Identical to [`set`](Fields::set) except that a key normalizing to an
    /// empty path is an [`EventError::EmptyPath`] instead of a silent no-op.
    pub fn try_set(
        &mut self,
        key: impl AsRef<str>,
        value: impl Into<Value>,
    ) -> crate::Result<Option<Value>> {
        let path = KeyPath::parse(key.as_ref());
        if path.is_empty() {
            return Err(EventError::EmptyPath {
                key: key.as_ref().to_string(),
            }
            .into());
        }
        Ok(self.set(key, value))
    }

    /// Adds an integer delta to the leaf at `key`.
    ///
    /// An absent leaf is initialized to `delta`. A leaf of any other kind
    /// (including float) is left untouched and the delta is dropped:
    /// instrumentation must never be able to fail the caller's path.
    pub fn add_int(&mut self, key: impl AsRef<str>, delta: i64) {
        self.accumulate(&KeyPath::parse(key), Value::Int(delta));
    }

    /// Adds a float delta to the leaf at `key`.
    ///
    /// Same rules as [`add_int`](Fields::add_int): absent leaves are
    /// initialized, mismatched kinds drop the delta.
    pub fn add_float(&mut self, key: impl AsRef<str>, delta: f64) {
        self.accumulate(&KeyPath::parse(key), Value::Float(delta));
    }

    /// Returns an iterator over key-value pairs in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Returns an iterator over keys in insertion order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Returns an iterator over values in insertion order
    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.entries.values()
    }

    /// Renders this tree as one JSON object.
    ///
    /// Key order equals insertion order at every level. Integers render
    /// without a fractional part; floats use `serde_json`'s shortest
    /// round-trip form.
    pub fn to_json(&self) -> crate::Result<String> {
        serde_json::to_string(self).map_err(Into::into)
    }

    /// Renders this tree as one JSON object, degrading to `""` on failure.
    ///
    /// Serialization of this closed value union cannot fail in practice;
    /// if it ever does, the failure is logged at error level rather than
    /// surfaced.
    pub fn to_json_string(&self) -> String {
        self.to_json().unwrap_or_else(|err| {
            tracing::error!(%err, "failed to render wide event as JSON");
            String::new()
        })
    }

    /// Walks to the map holding the leaf, creating intermediates as needed.
    ///
    /// An intermediate segment holding a scalar is replaced with a fresh
    /// map; the old scalar is destroyed.
    fn descend(&mut self, parents: &[String]) -> &mut Fields {
        let mut current = self;
        for segment in parents {
            let entry = current
                .entries
                .entry(segment.clone())
                .or_insert_with(|| Value::Map(Fields::new()));
            if !entry.is_map() {
                *entry = Value::Map(Fields::new());
            }
            match entry {
                Value::Map(fields) => current = fields,
                _ => unreachable!(),
            }
        }
        current
    }

    /// Shared leaf logic for the numeric accumulators.
    fn accumulate(&mut self, path: &KeyPath, delta: Value) {
        let Some((leaf, parents)) = path.segments().split_last() else {
            return;
        };
        let target = self.descend(parents);
        match target.entries.entry(leaf.clone()) {
            Entry::Vacant(slot) => {
                slot.insert(delta);
            }
            Entry::Occupied(mut slot) => match (slot.get_mut(), delta) {
                (Value::Int(existing), Value::Int(d)) => *existing += d,
                (Value::Float(existing), Value::Float(d)) => *existing += d,
                (existing, delta) => drop_delta(path, existing.type_name(), &delta),
            },
        }
    }
}

/// Records a dropped accumulator delta without surfacing an error.
fn drop_delta(path: &KeyPath, stored: &'static str, delta: &Value) {
    tracing::trace!(
        key = %path,
        stored,
        delta = delta.type_name(),
        "dropping accumulator delta for mismatched kind"
    );
}

impl fmt::Display for Fields {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        let mut first = true;
        for (key, value) in self.iter() {
            if !first {
                write!(f, ", ")?;
            }
            write!(f, "{key}: {value}")?;
            first = false;
        }
        write!(f, "}}")
    }
}

impl FromIterator<(String, Value)> for Fields {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        let mut fields = Fields::new();
        for (key, value) in iter {
            fields.set(key, value);
        }
        fields
    }
}

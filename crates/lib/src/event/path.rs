//! Normalized dotted keys for hierarchical field access.
//!
//! A wide-event key like `http.request.method` addresses one leaf in the
//! nested field tree, one segment per nesting level. Keys are
//! case-insensitive: normalization lower-cases the whole key before
//! splitting, so `Foo.Bar` and `foo.bar` address the same slot. Empty
//! segments are dropped (`.user`, `user.`, and `user..name` normalize the
//! way you would hope), which means degenerate inputs like `""` or `"..."`
//! normalize to zero segments and address nothing at all.

use std::fmt;

/// An owned, normalized dotted key.
///
/// Construction cannot fail; any string input has a defined (possibly
/// empty) normal form.
///
/// # Examples
///
/// ```
/// use widelog::event::KeyPath;
///
/// let path = KeyPath::parse("HTTP.Request..Method");
/// assert_eq!(path.to_string(), "http.request.method");
/// assert_eq!(path.len(), 3);
///
/// assert!(KeyPath::parse("...").is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyPath {
    segments: Vec<String>,
}

impl KeyPath {
    /// Parses and normalizes a dotted key.
    pub fn parse(key: impl AsRef<str>) -> Self {
        let segments = key
            .as_ref()
            .split('.')
            .filter(|segment| !segment.is_empty())
            .map(str::to_lowercase)
            .collect();
        Self { segments }
    }

    /// Returns the normalized segments, root-most first.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Returns the number of segments.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Returns true if the key normalized to zero segments.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Returns the final segment, the one that names the leaf.
    pub fn leaf(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }
}

impl From<&str> for KeyPath {
    fn from(key: &str) -> Self {
        Self::parse(key)
    }
}

impl fmt::Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("."))
    }
}

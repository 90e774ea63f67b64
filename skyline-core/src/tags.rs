//! Tag access for decoded entities.
//!
//! Classification only ever asks "what is the value under this key?", so the
//! capability exposed here is deliberately narrow: a missing key reads as the
//! empty string.

use std::collections::HashMap;
use std::hash::BuildHasher;

/// OpenStreetMap-style key/value tags carried by decoded entities.
pub type Tags = HashMap<String, String>;

/// Read-only lookup over an entity's tags.
///
/// # Examples
/// ```
/// use skyline_core::{TagLookup, Tags};
///
/// let tags = Tags::from([("natural".into(), "peak".into())]);
/// assert_eq!(tags.tag("natural"), "peak");
/// assert_eq!(tags.tag("name"), "");
/// ```
pub trait TagLookup {
    /// Return the value stored under `key`, or `""` when the key is absent.
    fn tag(&self, key: &str) -> &str;
}

impl<S: BuildHasher> TagLookup for HashMap<String, String, S> {
    fn tag(&self, key: &str) -> &str {
        self.get(key).map_or("", String::as_str)
    }
}

impl<T: TagLookup + ?Sized> TagLookup for &T {
    fn tag(&self, key: &str) -> &str {
        (**self).tag(key)
    }
}

//! Parameter containers shared by every layer of the client.
//!
//! The gateway matches parameter names without regard to case, but the
//! casing a caller supplied has to survive untouched into the wire body and
//! the signature input. [`CaseInsensitiveMap`] keeps both: lookups fold the
//! key, iteration yields the key as it was first assigned.

use std::collections::HashMap;
use std::fmt;

/// A single outgoing parameter value.
///
/// Every value is rendered to a string at serialization time. `Nil` renders
/// as the empty string.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ParamValue {
    /// Plain string value.
    Str(String),
    /// Rendered as `true` / `false`.
    Bool(bool),
    /// Rendered in decimal.
    Int(i64),
    /// Absent value, rendered as the empty string.
    Nil,
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(s) => f.write_str(s),
            Self::Bool(b) => write!(f, "{}", b),
            Self::Int(i) => write!(f, "{}", i),
            Self::Nil => Ok(()),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<&String> for ParamValue {
    fn from(value: &String) -> Self {
        Self::Str(value.clone())
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for ParamValue {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<u32> for ParamValue {
    fn from(value: u32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl<T: Into<ParamValue>> From<Option<T>> for ParamValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Nil, Into::into)
    }
}

/// Folds a parameter name for case-insensitive comparison.
///
/// Only ASCII letters are folded, matching [`starts_with_ignore_case`].
pub(crate) fn fold_key(key: &str) -> String {
    key.to_ascii_lowercase()
}

/// Returns true if `key` starts with `prefix`, ignoring ASCII case.
pub(crate) fn starts_with_ignore_case(key: &str, prefix: &str) -> bool {
    key.len() >= prefix.len()
        && key.is_char_boundary(prefix.len())
        && key[..prefix.len()].eq_ignore_ascii_case(prefix)
}

/// Map with case-insensitive keys that remembers insertion order.
///
/// - `insert` replaces the value of any key that matches case-insensitively;
///   the entry keeps its position and its first-assigned key casing.
/// - Iteration yields `(key, value)` in order of first assignment.
#[derive(Clone)]
pub struct CaseInsensitiveMap<V> {
    entries: Vec<(String, V)>,
    index: HashMap<String, usize>,
}

impl<V> CaseInsensitiveMap<V> {
    /// Create an empty map.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Set `key` to `value`, returning the previous value if one existed.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<V>) -> Option<V> {
        let key = key.into();
        let value = value.into();
        let folded = fold_key(&key);

        match self.index.get(&folded) {
            Some(&position) => Some(std::mem::replace(&mut self.entries[position].1, value)),
            None => {
                self.index.insert(folded, self.entries.len());
                self.entries.push((key, value));
                None
            }
        }
    }

    /// Look up a value by case-insensitive key.
    pub fn get(&self, key: &str) -> Option<&V> {
        self.index
            .get(&fold_key(key))
            .map(|&position| &self.entries[position].1)
    }

    /// Look up the stored key casing and value.
    pub fn get_key_value(&self, key: &str) -> Option<(&str, &V)> {
        self.index.get(&fold_key(key)).map(|&position| {
            let (k, v) = &self.entries[position];
            (k.as_str(), v)
        })
    }

    /// Returns true if a case-insensitively matching key is present.
    pub fn contains_key(&self, key: &str) -> bool {
        self.index.contains_key(&fold_key(key))
    }

    /// Remove a key, preserving the order of the remaining entries.
    pub fn remove(&mut self, key: &str) -> Option<V> {
        let position = self.index.remove(&fold_key(key))?;
        let (_, value) = self.entries.remove(position);
        for slot in self.index.values_mut() {
            if *slot > position {
                *slot -= 1;
            }
        }
        Some(value)
    }

    /// Number of distinct (folded) keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the map holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate `(key, value)` pairs in order of first assignment.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Iterate keys in order of first assignment.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }
}

impl CaseInsensitiveMap<String> {
    /// Look up a string value as `&str`.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).map(String::as_str)
    }
}

impl<V> Default for CaseInsensitiveMap<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: fmt::Debug> fmt::Debug for CaseInsensitiveMap<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<V: PartialEq> PartialEq for CaseInsensitiveMap<V> {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl<K: Into<String>, T: Into<V>, V> FromIterator<(K, T)> for CaseInsensitiveMap<V> {
    fn from_iter<I: IntoIterator<Item = (K, T)>>(iter: I) -> Self {
        let mut map = Self::new();
        map.extend(iter);
        map
    }
}

impl<K: Into<String>, T: Into<V>, V> Extend<(K, T)> for CaseInsensitiveMap<V> {
    fn extend<I: IntoIterator<Item = (K, T)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<V> IntoIterator for CaseInsensitiveMap<V> {
    type Item = (String, V);
    type IntoIter = std::vec::IntoIter<(String, V)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a, V> IntoIterator for &'a CaseInsensitiveMap<V> {
    type Item = (&'a str, &'a V);
    type IntoIter = std::iter::Map<
        std::slice::Iter<'a, (String, V)>,
        fn(&'a (String, V)) -> (&'a str, &'a V),
    >;

    fn into_iter(self) -> Self::IntoIter {
        let pair: fn(&'a (String, V)) -> (&'a str, &'a V) = |(k, v)| (k.as_str(), v);
        self.entries.iter().map(pair)
    }
}

/// Outgoing request parameters.
pub type ParameterSet = CaseInsensitiveMap<ParamValue>;

/// Decoded response parameters.
pub type ResponseParams = CaseInsensitiveMap<String>;

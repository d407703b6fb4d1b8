//! Expands indexed response fields into nested groups.
//!
//! Repeated structures arrive flattened, e.g.
//!
//! ```text
//! brq_services_1_name=ideal
//! brq_services_1_supportedcurrencies_1_code=EUR
//! brq_services_2_name=visa
//! ```
//!
//! [`map_fields`] turns the fields under `brq_services` into one
//! [`IndexedGroup`] per index, recursing into nested indexed attributes.

use crate::params::{starts_with_ignore_case, CaseInsensitiveMap, ResponseParams};

/// One occurrence of a repeated structure.
pub type IndexedGroup = CaseInsensitiveMap<FieldValue>;

/// Attribute of an [`IndexedGroup`].
#[derive(Clone, Debug, PartialEq)]
pub enum FieldValue {
    /// Terminal attribute.
    Value(String),
    /// Nested repeated structure.
    Groups(Vec<IndexedGroup>),
}

impl FieldValue {
    /// The terminal value, if this is one.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Value(value) => Some(value),
            Self::Groups(_) => None,
        }
    }

    /// The nested groups, if this is a nested structure.
    pub fn as_groups(&self) -> Option<&[IndexedGroup]> {
        match self {
            Self::Value(_) => None,
            Self::Groups(groups) => Some(groups),
        }
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Value(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Value(value.to_string())
    }
}

impl From<Vec<IndexedGroup>> for FieldValue {
    fn from(groups: Vec<IndexedGroup>) -> Self {
        Self::Groups(groups)
    }
}

/// Collect the indexed groups stored under `prefix`.
///
/// Indices are scanned from 1 upwards; the first index without fields, or
/// whose fields yield no attributes, ends the scan.
pub fn map_fields(params: &ResponseParams, prefix: &str) -> Vec<IndexedGroup> {
    let fields: Vec<(&str, &str)> = params.iter().map(|(k, v)| (k, v.as_str())).collect();
    map_indexed(&fields, prefix)
}

fn map_indexed(fields: &[(&str, &str)], prefix: &str) -> Vec<IndexedGroup> {
    let mut groups = Vec::new();

    for index in 1.. {
        let index_key = format!("{}_{}_", prefix, index);
        let index_length = split_indexed(&index_key).len();

        let matching: Vec<(&str, &str)> = fields
            .iter()
            .copied()
            .filter(|(key, _)| starts_with_ignore_case(key, &index_key))
            .collect();
        if matching.is_empty() {
            break;
        }

        let mut group = IndexedGroup::new();
        for &(key, value) in &matching {
            let pieces = split_indexed(key);
            let name = match pieces.get(index_length) {
                Some(name) if !name.is_empty() => *name,
                _ => {
                    tracing::debug!(key, prefix = %index_key, "skipping malformed indexed field");
                    continue;
                }
            };

            if pieces.len() == index_length + 1 {
                group.insert(name, FieldValue::from(value));
            } else if !group.contains_key(name) {
                let nested_prefix = format!("{}{}", index_key, name);
                group.insert(name, FieldValue::Groups(map_indexed(&matching, &nested_prefix)));
            }
        }

        if group.is_empty() {
            break;
        }
        groups.push(group);
    }

    groups
}

/// Split a key on every `_<digits>_` marker, dropping trailing empty pieces.
///
/// `brq_services_1_supportedcurrencies_2_code` splits into
/// `["brq_services", "supportedcurrencies", "code"]`.
fn split_indexed(key: &str) -> Vec<&str> {
    let bytes = key.as_bytes();
    let mut pieces = Vec::new();
    let mut start = 0;
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'_' {
            let mut end = i + 1;
            while end < bytes.len() && bytes[end].is_ascii_digit() {
                end += 1;
            }
            if end < bytes.len() && bytes[end] == b'_' {
                pieces.push(&key[start..i]);
                start = end + 1;
                i = start;
                continue;
            }
        }
        i += 1;
    }
    pieces.push(&key[start..]);

    while pieces.last().is_some_and(|piece| piece.is_empty()) {
        pieces.pop();
    }
    pieces
}

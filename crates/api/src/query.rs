//! Query-parameter normalization and encoding.
//!
//! The API answers an explicitly empty parameter set with `400 Bad Request`, so every
//! "empty" shape collapses to *no query string at all*.

use crate::error::{ApiError, Result};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use serde_json::{Map, Value};

/// Bytes escaped in query keys, query values and path segments.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryPair {
    pub key: String,
    pub value: String,
}

impl QueryPair {
    fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Normalize caller-supplied query parameters into an encoded query string.
///
/// Returns `Ok(None)` for every empty shape: absent, `null`, `{}`, an object whose values are
/// all falsy, an empty or whitespace-only string, an empty array, `false` and `0`.
/// Stripping is all-or-nothing: an object with at least one truthy value is sent whole.
///
/// Accepted non-empty shapes:
/// - object: one pair per key; arrays repeat the key per element
/// - string: a pre-encoded raw query string (a leading `?` is dropped)
/// - array of `[key, value]` pairs
///
/// # Errors
///
/// Returns [`ApiError::InvalidRequest`] for any other shape.
pub fn normalize_query(query: Option<&Value>) -> Result<Option<String>> {
    let Some(query) = query else {
        return Ok(None);
    };
    if is_empty_params(query) {
        return Ok(None);
    }

    match query {
        Value::String(raw) => {
            let raw = raw.trim();
            let raw = raw.strip_prefix('?').unwrap_or(raw);
            if raw.is_empty() {
                Ok(None)
            } else {
                Ok(Some(raw.to_string()))
            }
        }
        Value::Object(map) => Ok(Some(encode_pairs(&object_pairs(map)))),
        Value::Array(items) => Ok(Some(encode_pairs(&array_pairs(items)?))),
        other => Err(ApiError::InvalidRequest(format!(
            "unsupported query parameter shape: {other}"
        ))),
    }
}

/// Whether the parameters as a whole count as "no parameters".
#[must_use]
pub fn is_empty_params(query: &Value) -> bool {
    match query {
        Value::Object(map) => map.values().all(|v| !is_truthy(v)),
        Value::String(s) => s.trim().is_empty(),
        Value::Array(a) => a.is_empty(),
        other => !is_truthy(other),
    }
}

/// JSON truthiness: `null`, `false`, zero, `""`, `[]` and `{}` are falsy.
#[must_use]
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

fn object_pairs(map: &Map<String, Value>) -> Vec<QueryPair> {
    let mut out = Vec::with_capacity(map.len());
    for (key, value) in map {
        match value {
            Value::Array(items) => {
                out.extend(items.iter().map(|v| QueryPair::new(key, value_to_string(v))));
            }
            other => out.push(QueryPair::new(key, value_to_string(other))),
        }
    }
    out
}

fn array_pairs(items: &[Value]) -> Result<Vec<QueryPair>> {
    items
        .iter()
        .map(|item| match item.as_array().map(Vec::as_slice) {
            Some([Value::String(k), v]) => Ok(QueryPair::new(k, value_to_string(v))),
            _ => Err(ApiError::InvalidRequest(format!(
                "query parameter list entries must be [key, value] pairs, got {item}"
            ))),
        })
        .collect()
}

fn encode_pairs(pairs: &[QueryPair]) -> String {
    pairs
        .iter()
        .map(|p| format!("{}={}", encode_component(&p.key), encode_component(&p.value)))
        .collect::<Vec<_>>()
        .join("&")
}

/// Percent-encode everything outside the RFC 3986 unreserved set.
#[must_use]
pub fn encode_component(s: &str) -> String {
    utf8_percent_encode(s, COMPONENT).to_string()
}

fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        _ => value.to_string(),
    }
}

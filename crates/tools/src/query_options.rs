//! Typed query options shared by list and get-by-id operations.
//!
//! The API follows JSON:API conventions (`page[limit]`, `filter[...]`, `fields[...]`,
//! `include`, `sort`). Keys this record does not know are passed through verbatim so new
//! remote filters work without a release.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// A string or a list of strings; lists are sent comma-joined.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StringList {
    One(String),
    Many(Vec<String>),
}

impl StringList {
    #[must_use]
    pub fn joined(&self) -> String {
        match self {
            Self::One(s) => s.clone(),
            Self::Many(items) => items.join(","),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryOptions {
    /// `page[limit]`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_limit: Option<u64>,
    /// `page[offset]`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_offset: Option<u64>,
    /// Related resources to side-load.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include: Option<StringList>,
    /// Sparse fieldsets, keyed by resource type: `fields[<type>]`.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub fields: BTreeMap<String, StringList>,
    /// Filters, keyed by attribute: `filter[<key>]`.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub filter: BTreeMap<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort: Option<String>,
    /// Unrecognized keys, sent as given.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl QueryOptions {
    /// Render as the flat key/value object the executor expects.
    ///
    /// Recognized keys win over pass-through keys with the same wire name.
    #[must_use]
    pub fn to_query(&self) -> Value {
        let mut out = self.extra.clone();

        if let Some(limit) = self.page_limit {
            out.insert("page[limit]".to_string(), Value::from(limit));
        }
        if let Some(offset) = self.page_offset {
            out.insert("page[offset]".to_string(), Value::from(offset));
        }
        if let Some(include) = &self.include {
            out.insert("include".to_string(), Value::String(include.joined()));
        }
        for (kind, list) in &self.fields {
            out.insert(format!("fields[{kind}]"), Value::String(list.joined()));
        }
        for (key, value) in &self.filter {
            out.insert(format!("filter[{key}]"), filter_value(value));
        }
        if let Some(sort) = &self.sort {
            out.insert("sort".to_string(), Value::String(sort.clone()));
        }

        Value::Object(out)
    }
}

fn filter_value(value: &Value) -> Value {
    match value {
        Value::Array(items) if items.iter().all(|v| !v.is_array() && !v.is_object()) => {
            let parts: Vec<String> = items
                .iter()
                .map(|v| match v {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect();
            Value::String(parts.join(","))
        }
        other => other.clone(),
    }
}

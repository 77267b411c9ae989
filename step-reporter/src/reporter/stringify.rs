// Copyright (c) The step-reporter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Stable text for assertion values.
//!
//! Two equal values must always produce identical text, so object keys are
//! written in sorted order regardless of how the map stores them.

use serde_json::{Map, Value};
use std::mem;

/// Returns true if `a` and `b` are the same kind of JSON value.
pub(super) fn same_type(a: &Value, b: &Value) -> bool {
    mem::discriminant(a) == mem::discriminant(b)
}

/// Renders `value` as text: scalars inline, arrays and objects spread over
/// lines with two-space indentation.
pub(super) fn stringify(value: &Value) -> String {
    let sorted = sort_keys(value);
    // Serializing a Value can't fail.
    serde_json::to_string_pretty(&sorted).unwrap_or_else(|_| sorted.to_string())
}

/// Rebuilds objects with their keys in sorted order, whatever order the map
/// type keeps.
fn sort_keys(value: &Value) -> Value {
    match value {
        Value::Array(items) => Value::Array(items.iter().map(sort_keys).collect()),
        Value::Object(map) => {
            let mut entries: Vec<_> = map.iter().collect();
            entries.sort_unstable_by(|(a, _), (b, _)| a.cmp(b));
            Value::Object(
                entries
                    .into_iter()
                    .map(|(key, item)| (key.clone(), sort_keys(item)))
                    .collect::<Map<_, _>>(),
            )
        }
        scalar => scalar.clone(),
    }
}

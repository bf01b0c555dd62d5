// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Lenient deserializers for dataset payloads.
//!
//! Openkaarten endpoints are loosely typed: ids arrive as numbers or strings,
//! fields may be `null`, and `features` is sometimes a single object.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Accept a string, a number or `null` and normalise to a `String`.
pub fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    })
}

/// Treat an explicit `null` the same as a missing field.
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Accept a sequence, a single object (one-element sequence) or `null`.
///
/// Sequence elements are decoded one by one; an element that does not
/// decode is logged and skipped so the rest survive. Any other shape yields
/// an empty list.
pub fn one_or_many<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .filter_map(|(index, item)| {
                serde_json::from_value(item)
                    .map_err(|e| tracing::warn!(index, error = %e, "Skipping malformed element"))
                    .ok()
            })
            .collect(),
        item @ Value::Object(_) => match serde_json::from_value(item) {
            Ok(one) => vec![one],
            Err(e) => {
                tracing::warn!(error = %e, "Skipping malformed element");
                Vec::new()
            }
        },
        _ => Vec::new(),
    })
}

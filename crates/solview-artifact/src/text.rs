//! Lenient deserializers for loosely typed text fields.
//!
//! Upstream JSON is model-generated: a `code` field may arrive as an array of
//! lines, a list may arrive as a single string, and any field may be `null`.
//! These helpers coerce such values instead of rejecting the whole payload.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::types::Approach;

/// Textual representation of a JSON value. `null` is absent.
pub(crate) fn value_to_text(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}

/// Deserialize an optional text field, coercing non-string values.
pub(crate) fn optional_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(value_to_text))
}

/// Deserialize a text field that defaults to empty when absent or `null`.
pub(crate) fn text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(optional_text(deserializer)?.unwrap_or_default())
}

/// Deserialize an optional list of text items.
///
/// A bare scalar becomes a one-item list; `null` items are dropped.
pub(crate) fn optional_text_list<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null) => None,
        Some(Value::Array(items)) => Some(items.into_iter().filter_map(value_to_text).collect()),
        Some(other) => value_to_text(other).map(|item| vec![item]),
    })
}

/// Deserialize the approaches list, skipping entries that are not objects.
pub(crate) fn approaches<'de, D>(deserializer: D) -> Result<Vec<Approach>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    let Some(Value::Array(items)) = value else {
        return Ok(Vec::new());
    };

    Ok(items
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| match serde_json::from_value(item) {
            Ok(approach) => Some(approach),
            Err(e) => {
                tracing::debug!(index, error = %e, "Skipping malformed approach");
                None
            }
        })
        .collect())
}

//! Open key/value context describing what an assignment is about.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Schema-less context bag (cycle id, report id, phase name, ...).
///
/// The engine stores and matches context data but never interprets
/// individual keys; only the callers that build assignments know what the
/// keys mean.
///
/// # Examples
///
/// ```
/// use universal_assignment::assignment::domain::ContextData;
///
/// let stored = ContextData::new()
///     .with("cycle_id", 58)
///     .with("report_id", 156)
///     .with("phase_name", "Scoping");
/// let query = ContextData::new().with("report_id", "156");
/// assert!(stored.contains(&query));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContextData(BTreeMap<String, Value>);

impl ContextData {
    /// Creates an empty context.
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Adds or replaces a key.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Adds or replaces a key in place.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    /// Returns the value stored under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Returns `true` when no keys are present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Returns `true` when every key in `partial` is present here with a
    /// matching value.
    ///
    /// Scalars match by value; a number also matches a string holding the
    /// same text, since callers mix `58` and `"58"` for the same id.
    #[must_use]
    pub fn contains(&self, partial: &Self) -> bool {
        partial.0.iter().all(|(key, expected)| {
            self.0
                .get(key)
                .is_some_and(|stored| values_match(stored, expected))
        })
    }

    /// Converts the context into a JSON object, e.g. for template rendering.
    #[must_use]
    pub fn to_json_object(&self) -> Map<String, Value> {
        self.0
            .iter()
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }
}

impl FromIterator<(String, Value)> for ContextData {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

fn values_match(stored: &Value, expected: &Value) -> bool {
    if stored == expected {
        return true;
    }
    match (stored, expected) {
        (Value::Number(number), Value::String(text))
        | (Value::String(text), Value::Number(number)) => number.to_string() == text.trim(),
        _ => false,
    }
}

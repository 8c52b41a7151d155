//! Test case model

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Test case as stored with a problem
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestCase {
    /// Parameter name to argument value
    #[serde(deserialize_with = "deserialize_input")]
    pub input: Map<String, Value>,
    /// Expected return value
    pub output: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

impl TestCase {
    pub fn new(input: Map<String, Value>, output: Value) -> Self {
        Self {
            input,
            output,
            explanation: None,
        }
    }

    /// Argument value for a parameter
    pub fn argument(&self, name: &str) -> Option<&Value> {
        self.input.get(name)
    }

    /// Expected output with JSON-encoded strings unwrapped.
    ///
    /// Problem documents sometimes store `"[0,1]"` instead of `[0,1]`.
    pub fn expected(&self) -> Value {
        match &self.output {
            Value::String(raw) => serde_json::from_str(raw).unwrap_or_else(|_| self.output.clone()),
            other => other.clone(),
        }
    }
}

/// Accepts either a JSON object or a string containing one.
fn deserialize_input<'de, D>(deserializer: D) -> Result<Map<String, Value>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Object(map) => Ok(map),
        Value::String(raw) => match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Object(map)) => Ok(map),
            _ => Err(serde::de::Error::custom(
                "test case input string must encode a JSON object",
            )),
        },
        Value::Null => Ok(Map::new()),
        _ => Err(serde::de::Error::custom("test case input must be an object")),
    }
}

/// Truncate on a character boundary, appending `...` when shortened
pub fn truncate_chars(text: &str, max_len: usize) -> String {
    match text.char_indices().nth(max_len) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

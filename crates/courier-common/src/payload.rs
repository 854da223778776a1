//! The key/value payload exchanged in both directions.

use serde_json::{Map, Value};
use std::borrow::Cow;

/// A request or response payload: string keys mapped to strings, nested
/// payloads or sequences.
///
/// Positional entries (`a[]=x`, array indices) are stored under their
/// decimal index, so keys are always strings.
pub type Payload = Map<String, Value>;

/// Text form of a scalar value.
///
/// Strings are returned as-is, numbers in their JSON notation, `true` as
/// `"1"`, and `false`/`null` as the empty string. Containers have no scalar
/// text and yield the empty string as well.
pub fn scalar_text(value: &Value) -> Cow<'_, str> {
    match value {
        Value::String(s) => Cow::Borrowed(s.as_str()),
        Value::Number(n) => Cow::Owned(n.to_string()),
        Value::Bool(true) => Cow::Borrowed("1"),
        Value::Bool(false) | Value::Null | Value::Array(_) | Value::Object(_) => {
            Cow::Borrowed("")
        }
    }
}

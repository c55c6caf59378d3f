//! Removal of transport-added backslash escapes from payload strings.

use serde_json::Value;

/// Recursively unescapes every string value in `value`. Object keys are left
/// untouched.
#[must_use]
pub fn unslash(value: Value) -> Value {
    match value {
        Value::String(text) => Value::String(strip_slashes(&text)),
        Value::Array(items) => Value::Array(items.into_iter().map(unslash).collect()),
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, value)| (key, unslash(value)))
                .collect(),
        ),
        other => other,
    }
}

/// Unescapes one string: `\x` becomes `x`, `\0` becomes NUL, and a trailing
/// lone backslash is dropped.
#[must_use]
pub fn strip_slashes(text: &str) -> String {
    let mut output = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            output.push(ch);
            continue;
        }
        match chars.next() {
            Some('0') => output.push('\0'),
            Some(escaped) => output.push(escaped),
            None => {}
        }
    }
    output
}

//! Total, never-failing navigation over loosely-typed JSON payloads.
//!
//! Every lookup returns a [`JsonView`], possibly pointing at nothing. Leaf
//! accessors return `Option`s (or zero values for the `_or_default` family) so
//! decoders can walk upstream payloads whose shape drifts without panicking.

use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, Default)]
pub struct JsonView<'a> {
    value: Option<&'a Value>,
}

impl<'a> JsonView<'a> {
    pub fn new(value: &'a Value) -> Self {
        JsonView { value: Some(value) }
    }

    pub fn missing() -> Self {
        JsonView { value: None }
    }

    pub fn exists(&self) -> bool {
        matches!(self.value, Some(v) if !v.is_null())
    }

    pub fn value(&self) -> Option<&'a Value> {
        self.value.filter(|v| !v.is_null())
    }

    pub fn get(&self, key: &str) -> JsonView<'a> {
        JsonView {
            value: self.value.and_then(|v| v.get(key)),
        }
    }

    pub fn index(&self, index: usize) -> JsonView<'a> {
        JsonView {
            value: self.value.and_then(|v| v.get(index)),
        }
    }

    /// Follows `path` one segment at a time. Numeric segments index into
    /// arrays; on objects they are treated as plain keys.
    pub fn at(&self, path: &[&str]) -> JsonView<'a> {
        path.iter().fold(*self, |view, segment| match view.value {
            Some(Value::Array(_)) => match segment.parse::<usize>() {
                Ok(i) => view.index(i),
                Err(_) => JsonView::missing(),
            },
            _ => view.get(segment),
        })
    }

    pub fn as_str(&self) -> Option<&'a str> {
        self.value.and_then(Value::as_str)
    }

    pub fn as_string(&self) -> Option<String> {
        self.as_str().map(str::to_string)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self.value? {
            Value::Bool(b) => Some(*b),
            Value::String(s) => s.parse().ok(),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self.value? {
            Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self.value? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<Vec<JsonView<'a>>> {
        self.value
            .and_then(Value::as_array)
            .map(|items| items.iter().map(JsonView::new).collect())
    }

    pub fn as_object(&self) -> Option<&'a Map<String, Value>> {
        self.value.and_then(Value::as_object)
    }

    /// Iterates array elements; anything else yields nothing.
    pub fn iter(&self) -> impl Iterator<Item = JsonView<'a>> {
        self.value
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
            .map(JsonView::new)
    }

    pub fn string_or_default(&self) -> String {
        self.as_string().unwrap_or_default()
    }

    pub fn bool_or_default(&self) -> bool {
        self.as_bool().unwrap_or_default()
    }

    pub fn i64_or_default(&self) -> i64 {
        self.as_i64().unwrap_or_default()
    }

    pub fn f64_or_default(&self) -> f64 {
        self.as_f64().unwrap_or_default()
    }

    pub fn array_or_default(&self) -> Vec<JsonView<'a>> {
        self.as_array().unwrap_or_default()
    }

    /// Reads the platform's text node, either `simpleText` or a list of `runs`.
    pub fn text(&self) -> Option<String> {
        if let Some(text) = self.get("simpleText").as_string() {
            return Some(text);
        }
        if let Some(content) = self.get("content").as_string() {
            return Some(content);
        }
        let runs = self.get("runs").as_array()?;
        Some(runs.iter().filter_map(|run| run.get("text").as_str()).collect())
    }

    pub fn to_raw_string(&self) -> Option<String> {
        self.value().map(Value::to_string)
    }

    pub fn to_value(&self) -> Option<Value> {
        self.value().cloned()
    }
}

impl<'a> From<&'a Value> for JsonView<'a> {
    fn from(value: &'a Value) -> Self {
        JsonView::new(value)
    }
}

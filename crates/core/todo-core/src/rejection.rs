//! The error value every client operation resolves to on failure.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Field name to validation messages, as sent by the server on 4xx.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Reads a JSON object whose values are a string or a list of strings.
    ///
    /// Returns `None` for any other shape, including an empty object.
    pub fn from_json(body: &Value) -> Option<Self> {
        let object = body.as_object()?;
        let mut errors = Self::new();
        for (field, messages) in object {
            match messages {
                Value::String(message) => errors.insert(field.as_str(), message.as_str()),
                Value::Array(items) => {
                    for item in items {
                        errors.insert(field.as_str(), item.as_str()?);
                    }
                }
                _ => return None,
            }
        }
        (!errors.is_empty()).then_some(errors)
    }
}

impl std::fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for (field, messages) in self.iter() {
            if !first {
                f.write_str(" ")?;
            }
            first = false;
            write!(f, "{}: {}", field, messages.join(", "))?;
        }
        Ok(())
    }
}

/// Why an operation failed, in a form the front end can render directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Rejection {
    /// A single human readable message.
    Message(String),

    /// Per-field validation messages.
    Fields(FieldErrors),
}

impl Rejection {
    pub fn message(message: impl Into<String>) -> Self {
        Self::Message(message.into())
    }

    /// Interprets an error response body.
    ///
    /// A string `detail` wins; otherwise a field map is kept verbatim; any other
    /// body falls back to `fallback`.
    pub fn from_body(body: &Value, fallback: &str) -> Self {
        if let Some(detail) = body.get("detail").and_then(Value::as_str) {
            return Self::Message(detail.to_string());
        }
        match FieldErrors::from_json(body) {
            Some(fields) => Self::Fields(fields),
            None => Self::Message(fallback.to_string()),
        }
    }

    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            Self::Fields(fields) => Some(fields),
            Self::Message(_) => None,
        }
    }
}

impl std::fmt::Display for Rejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Message(message) => f.write_str(message),
            Self::Fields(fields) => std::fmt::Display::fmt(fields, f),
        }
    }
}

impl std::error::Error for Rejection {}

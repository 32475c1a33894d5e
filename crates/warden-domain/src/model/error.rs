//! Recoverable error records
//!
//! These are collected into a ResultExecute and returned to the caller.
//! They are never raised; storage failures travel on a separate channel.

use serde::{Deserialize, Serialize};

use super::entity::Value;

/// Closed set of recoverable error kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    /// Required field missing on create
    NotDefined,
    /// Value fails the attribute's predicate
    NotValid,
    /// Value collides with another entity
    NotUnique,
    /// Operation- or attribute-level permission denied
    NotAuthorized,
}

impl ErrorKind {
    pub const ALL: [ErrorKind; 4] = [
        ErrorKind::NotDefined,
        ErrorKind::NotValid,
        ErrorKind::NotUnique,
        ErrorKind::NotAuthorized,
    ];

    /// Upper-snake suffix used when building codes
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::NotDefined => "NOT_DEFINED",
            ErrorKind::NotValid => "NOT_VALID",
            ErrorKind::NotUnique => "NOT_UNIQUE",
            ErrorKind::NotAuthorized => "NOT_AUTHORIZED",
        }
    }

    /// Default message template; `{label}` and `{value}` are substituted
    pub fn default_template(&self) -> &'static str {
        match self {
            ErrorKind::NotDefined => "The {label} is required",
            ErrorKind::NotValid => "The {label} is not valid",
            ErrorKind::NotUnique => "The {label} is already taken",
            ErrorKind::NotAuthorized => "You're not authorized to interact with {label}",
        }
    }
}

impl core::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured, immutable error value. Serializes to `{code, label, message, value}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorRecord {
    #[serde(skip, default = "default_kind")]
    kind: ErrorKind,
    code: String,
    label: String,
    message: String,
    value: Value,
}

fn default_kind() -> ErrorKind {
    ErrorKind::NotValid
}

impl ErrorRecord {
    pub fn new(
        kind: ErrorKind,
        code: impl Into<String>,
        label: impl Into<String>,
        message: impl Into<String>,
        value: Value,
    ) -> Self {
        Self {
            kind,
            code: code.into(),
            label: label.into(),
            message: message.into(),
            value,
        }
    }

    /// Build a record whose message comes from a template
    pub fn from_template(
        kind: ErrorKind,
        code: impl Into<String>,
        label: impl Into<String>,
        template: &str,
        value: Value,
    ) -> Self {
        let label = label.into();
        let message = render(template, &label, &value);
        Self::new(kind, code, label, message, value)
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    /// The external `{code, label, message, value}` shape
    pub fn to_json(&self) -> Value {
        serde_json::json!({
            "code": self.code,
            "label": self.label,
            "message": self.message,
            "value": self.value,
        })
    }
}

impl core::fmt::Display for ErrorRecord {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

fn render(template: &str, label: &str, value: &Value) -> String {
    let value = match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    };
    template.replace("{label}", label).replace("{value}", &value)
}

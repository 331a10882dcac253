//! Value-against-schema checks.
//!
//! [`SchemaValidator`] is the seam for the rule engine; [`BuiltinValidator`]
//! covers the closed [`SchemaKind`] set. Errors are collected, never thrown,
//! so one pass reports every problem in a value.

use serde_json::{Number, Value};

use crate::schema::{Schema, SchemaKind};

/// One problem found in a value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaError {
    /// Dotted property path (`bounds.width`, `ids.2`); empty at the root.
    pub path: String,
    /// Human-readable message, ending with a period.
    pub message: String,
}

impl SchemaError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Borrowed view of a call argument: plain data or a script function.
#[derive(Debug, Clone, Copy)]
pub enum ArgRef<'a> {
    Value(&'a Value),
    Function,
}

impl ArgRef<'_> {
    /// Type name used in validation messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Function => "function",
            Self::Value(value) => json_type_name(value),
        }
    }
}

/// Validate a value against a schema and return every error found.
pub trait SchemaValidator {
    fn validate(&self, value: ArgRef<'_>, schema: &Schema) -> Vec<SchemaError>;
}

/// Validator for the built-in schema kinds.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinValidator;

impl SchemaValidator for BuiltinValidator {
    fn validate(&self, value: ArgRef<'_>, schema: &Schema) -> Vec<SchemaError> {
        let mut errors = Vec::new();
        check(value, schema, "", &mut errors);
        errors
    }
}

fn check(value: ArgRef<'_>, schema: &Schema, path: &str, errors: &mut Vec<SchemaError>) {
    let value = match (value, &schema.kind) {
        (ArgRef::Function, SchemaKind::Callback) => return,
        (ArgRef::Value(value), kind) if !matches!(kind, SchemaKind::Callback) => value,
        (actual, _) => {
            errors.push(type_mismatch(path, schema, actual));
            return;
        },
    };

    match &schema.kind {
        SchemaKind::Integer => {
            if !is_integer(value) {
                errors.push(type_mismatch(path, schema, ArgRef::Value(value)));
            }
        },
        SchemaKind::PositiveInteger => {
            if !is_integer(value) {
                errors.push(type_mismatch(path, schema, ArgRef::Value(value)));
            } else if value.as_f64().is_some_and(|n| n < 0.0) {
                errors.push(SchemaError::new(path, "Value must not be less than 0."));
            }
        },
        SchemaKind::String => {
            if !value.is_string() {
                errors.push(type_mismatch(path, schema, ArgRef::Value(value)));
            }
        },
        SchemaKind::Boolean => {
            if !value.is_boolean() {
                errors.push(type_mismatch(path, schema, ArgRef::Value(value)));
            }
        },
        SchemaKind::Object { properties } => {
            let Some(object) = value.as_object() else {
                errors.push(type_mismatch(path, schema, ArgRef::Value(value)));
                return;
            };
            for (name, property) in properties {
                let child = join_path(path, name);
                match object.get(name) {
                    None | Some(Value::Null) => {
                        if !property.optional {
                            errors.push(SchemaError::new(child, "Property is required."));
                        }
                    },
                    Some(v) => check(ArgRef::Value(v), property, &child, errors),
                }
            }
            for key in object.keys() {
                if !properties.iter().any(|(name, _)| name == key) {
                    errors.push(SchemaError::new(
                        join_path(path, key),
                        "Unexpected property.",
                    ));
                }
            }
        },
        SchemaKind::Array { items } => {
            let Some(array) = value.as_array() else {
                errors.push(type_mismatch(path, schema, ArgRef::Value(value)));
                return;
            };
            for (index, item) in array.iter().enumerate() {
                check(
                    ArgRef::Value(item),
                    items,
                    &join_path(path, &index.to_string()),
                    errors,
                );
            }
        },
        SchemaKind::Callback => {},
    }
}

fn type_mismatch(path: &str, schema: &Schema, actual: ArgRef<'_>) -> SchemaError {
    SchemaError::new(
        path,
        format!(
            "Expected '{}' but got '{}'.",
            schema.type_name(),
            actual.type_name()
        ),
    )
}

fn join_path(parent: &str, child: &str) -> String {
    if parent.is_empty() {
        child.to_string()
    } else {
        format!("{parent}.{child}")
    }
}

fn is_integer(value: &Value) -> bool {
    value.as_number().is_some_and(number_is_integral)
}

fn number_is_integral(n: &Number) -> bool {
    n.is_i64() || n.is_u64() || n.as_f64().is_some_and(|f| f.is_finite() && f.fract() == 0.0)
}

/// JSON type name of a value, distinguishing integers from other numbers.
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if number_is_integral(n) => "integer",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

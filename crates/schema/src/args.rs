//! Positional argument validation.
//!
//! Runs synchronously before a call is allowed to cross the native boundary.
//! A call that fails here is never dispatched.

use std::fmt;

use serde_json::Value;

use crate::{
    error::{ArgumentIssue, ValidationError},
    schema::Schema,
    validator::{ArgRef, BuiltinValidator, SchemaValidator},
};

/// One actual argument of a call. `F` is the script-side function type.
pub enum Arg<F> {
    Value(Value),
    Function(F),
}

impl<F> Arg<F> {
    /// Null values count as not supplied.
    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Value(Value::Null))
    }

    pub fn as_arg_ref(&self) -> ArgRef<'_> {
        match self {
            Self::Value(value) => ArgRef::Value(value),
            Self::Function(_) => ArgRef::Function,
        }
    }

    pub fn is_function(&self) -> bool {
        matches!(self, Self::Function(_))
    }

    pub fn into_value(self) -> Option<Value> {
        match self {
            Self::Value(value) => Some(value),
            Self::Function(_) => None,
        }
    }

    pub fn into_function(self) -> Option<F> {
        match self {
            Self::Function(f) => Some(f),
            Self::Value(_) => None,
        }
    }
}

impl<F> From<Value> for Arg<F> {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

impl<F> fmt::Debug for Arg<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Self::Function(_) => f.write_str("Function(..)"),
        }
    }
}

/// Validate `args` against `schemas` with the built-in rules.
pub fn validate_args<F>(args: &[Arg<F>], schemas: &[Schema]) -> Result<(), ValidationError> {
    validate_args_with(&BuiltinValidator, args, schemas)
}

/// Validate `args` against `schemas` with a caller-supplied rule engine.
///
/// Excess arguments are rejected before any position is looked at. Every
/// position is then checked and all issues are reported together.
pub fn validate_args_with<F, V>(
    validator: &V,
    args: &[Arg<F>],
    schemas: &[Schema],
) -> Result<(), ValidationError>
where
    V: SchemaValidator + ?Sized,
{
    if args.len() > schemas.len() {
        return Err(ValidationError::TooManyArguments {
            given: args.len(),
            accepted: schemas.len(),
        });
    }

    let mut issues = Vec::new();
    for (index, schema) in schemas.iter().enumerate() {
        match args.get(index).filter(|arg| !arg.is_absent()) {
            Some(arg) => {
                let errors = validator.validate(arg.as_arg_ref(), schema);
                if !errors.is_empty() {
                    issues.push(ArgumentIssue::Invalid { index, errors });
                }
            },
            None if schema.optional => {},
            None => issues.push(ArgumentIssue::Missing { index }),
        }
    }

    if issues.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::Invalid(issues))
    }
}

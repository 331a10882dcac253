//! Parameter schemas and the argument validator.
//!
//! Every call is checked here before a request may leave the script side.

pub mod args;
pub mod error;
pub mod schema;
pub mod validator;

pub use {
    args::{Arg, validate_args, validate_args_with},
    error::{ArgumentIssue, ValidationError},
    schema::{Schema, SchemaKind, types},
    validator::{ArgRef, BuiltinValidator, SchemaError, SchemaValidator, json_type_name},
};

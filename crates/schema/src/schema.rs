//! Declarative parameter schemas.
//!
//! A schema is a closed set of kinds plus an `optional` flag. Schemas are
//! built once per operation and shared by every call to it.

use serde_json::{Map, Value, json};

/// The kind of value a schema accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaKind {
    /// A number without a fractional part.
    Integer,
    /// An integer that is not negative.
    PositiveInteger,
    String,
    Boolean,
    /// A script-side function, i.e. a completion callback.
    Callback,
    /// An object with declared properties, in declaration order.
    /// Undeclared properties are rejected.
    Object { properties: Vec<(String, Schema)> },
    /// An array whose items all match one schema.
    Array { items: Box<Schema> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    pub kind: SchemaKind,
    pub optional: bool,
}

impl Schema {
    pub const fn new(kind: SchemaKind) -> Self {
        Self {
            kind,
            optional: false,
        }
    }

    pub const fn integer() -> Self {
        Self::new(SchemaKind::Integer)
    }

    pub const fn positive_integer() -> Self {
        Self::new(SchemaKind::PositiveInteger)
    }

    pub const fn string() -> Self {
        Self::new(SchemaKind::String)
    }

    pub const fn boolean() -> Self {
        Self::new(SchemaKind::Boolean)
    }

    pub const fn callback() -> Self {
        Self::new(SchemaKind::Callback)
    }

    pub fn object<I, K>(properties: I) -> Self
    where
        I: IntoIterator<Item = (K, Schema)>,
        K: Into<String>,
    {
        Self::new(SchemaKind::Object {
            properties: properties
                .into_iter()
                .map(|(name, schema)| (name.into(), schema))
                .collect(),
        })
    }

    pub fn array(items: Schema) -> Self {
        Self::new(SchemaKind::Array {
            items: Box::new(items),
        })
    }

    /// Mark the schema optional: an absent or null value is accepted.
    #[must_use]
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub const fn is_optional(&self) -> bool {
        self.optional
    }

    /// Type name used in validation messages.
    pub const fn type_name(&self) -> &'static str {
        match self.kind {
            SchemaKind::Integer | SchemaKind::PositiveInteger => "integer",
            SchemaKind::String => "string",
            SchemaKind::Boolean => "boolean",
            SchemaKind::Callback => "function",
            SchemaKind::Object { .. } => "object",
            SchemaKind::Array { .. } => "array",
        }
    }

    /// Render the schema as a JSON-Schema-like document for discovery.
    pub fn describe(&self) -> Value {
        let mut doc = Map::new();
        doc.insert("type".into(), json!(self.type_name()));
        match &self.kind {
            SchemaKind::PositiveInteger => {
                doc.insert("minimum".into(), json!(0));
            },
            SchemaKind::Object { properties } => {
                let props: Map<String, Value> = properties
                    .iter()
                    .map(|(name, schema)| (name.clone(), schema.describe()))
                    .collect();
                doc.insert("properties".into(), Value::Object(props));
            },
            SchemaKind::Array { items } => {
                doc.insert("items".into(), items.describe());
            },
            SchemaKind::Integer | SchemaKind::String | SchemaKind::Boolean | SchemaKind::Callback => {},
        }
        if self.optional {
            doc.insert("optional".into(), json!(true));
        }
        Value::Object(doc)
    }
}

/// Shorthands for the primitive schemas every surface uses.
pub mod types {
    use super::Schema;

    pub fn int() -> Schema {
        Schema::integer()
    }

    pub fn opt_int() -> Schema {
        Schema::integer().optional()
    }

    pub fn p_int() -> Schema {
        Schema::positive_integer()
    }

    pub fn opt_p_int() -> Schema {
        Schema::positive_integer().optional()
    }

    pub fn str() -> Schema {
        Schema::string()
    }

    pub fn opt_str() -> Schema {
        Schema::string().optional()
    }

    pub fn bool() -> Schema {
        Schema::boolean()
    }

    pub fn opt_bool() -> Schema {
        Schema::boolean().optional()
    }

    pub fn fun() -> Schema {
        Schema::callback()
    }

    pub fn opt_fun() -> Schema {
        Schema::callback().optional()
    }
}

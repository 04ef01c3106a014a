//! Declarative document schemas and their validator
//!
//! A [`Schema`] describes the accepted shape of a YAML document. The
//! validator walks a parsed [`serde_yaml::Value`] against it and collects
//! every violation instead of stopping at the first one. Only a document
//! without violations is converted into its typed form.

use std::path::Path;

use serde::de::DeserializeOwned;
use serde_yaml::Value;

use crate::error::{FieldError, ValidationError};

/// Accepted shape of a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Schema {
    Boolean,
    /// Non-negative integer (GitLab identifiers).
    Integer,
    String,
    List(&'static Schema),
    Dict(&'static [Field]),
}

/// A named entry of a [`Schema::Dict`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    pub name: &'static str,
    pub required: bool,
    pub schema: Schema,
}

impl Schema {
    fn type_name(&self) -> &'static str {
        match self {
            Schema::Boolean => "boolean",
            Schema::Integer => "non-negative integer",
            Schema::String => "string",
            Schema::List(_) => "list",
            Schema::Dict(_) => "dict",
        }
    }

    /// Validate `value` and return all violations.
    ///
    /// An empty result means the value conforms to the schema.
    pub fn validate(&self, value: &Value) -> Vec<FieldError> {
        let mut errors = Vec::new();
        check(self, value, "", &mut errors);
        errors
    }

    /// Parse a YAML document, validate it, and convert it to `T`.
    ///
    /// `origin` is attached to the error to tell the user which file was
    /// rejected; pass `None` for documents that do not come from a local file.
    pub fn parse_document<T: DeserializeOwned>(
        &self,
        content: &str,
        origin: Option<&Path>,
    ) -> std::result::Result<T, ValidationError> {
        let reject = |errors| ValidationError::new(origin.map(Path::to_path_buf), errors);

        let value: Value = serde_yaml::from_str(content)
            .map_err(|e| reject(vec![FieldError::new("", format!("invalid YAML: {}", e))]))?;

        if value.is_null() {
            return Err(reject(vec![FieldError::new("", "document is empty")]));
        }

        let errors = self.validate(&value);
        if !errors.is_empty() {
            return Err(reject(errors));
        }

        serde_yaml::from_value(value).map_err(|e| reject(vec![FieldError::new("", e.to_string())]))
    }
}

fn join(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", parent, name)
    }
}

fn check(schema: &Schema, value: &Value, field: &str, errors: &mut Vec<FieldError>) {
    match (schema, value) {
        (_, Value::Null) => errors.push(FieldError::new(field, "null value not allowed")),
        (Schema::Boolean, Value::Bool(_)) => {}
        (Schema::Integer, Value::Number(n)) if n.as_u64().is_some() => {}
        (Schema::String, Value::String(_)) => {}
        (Schema::List(item), Value::Sequence(items)) => {
            for (index, entry) in items.iter().enumerate() {
                check(item, entry, &format!("{}[{}]", field, index), errors);
            }
        }
        (Schema::Dict(fields), Value::Mapping(map)) => {
            for (key, entry) in map {
                let Some(name) = key.as_str() else {
                    errors.push(FieldError::new(field, "mapping keys must be strings"));
                    continue;
                };
                match fields.iter().find(|f| f.name == name) {
                    Some(known) => check(&known.schema, entry, &join(field, name), errors),
                    None => errors.push(FieldError::new(join(field, name), "unknown field")),
                }
            }
            for missing in fields
                .iter()
                .filter(|f| f.required && map.get(f.name).is_none())
            {
                errors.push(FieldError::new(join(field, missing.name), "required field"));
            }
        }
        (expected, _) => errors.push(FieldError::new(
            field,
            format!("must be of {} type", expected.type_name()),
        )),
    }
}

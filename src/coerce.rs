//! Coercion of raw default values into the type the DSL schema declares.
//!
//! Raw metadata stores most defaults as text (`"false"`, `"1000"`,
//! `"a,b"`). The editor validates against the schema, so a default has to be
//! a literal of the declared type before it is copied into a
//! `propertiesSchema`.

use serde_json::{Map, Number, Value};
use std::fmt;
use thiserror::Error;

/// Declared JSON-Schema type of one property, as far as coercion cares.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SchemaType {
    String,
    Boolean,
    Integer,
    Number,
    Array(Box<SchemaType>),
    Object,
    Null,
    /// No usable `type` keyword; values pass through unchanged.
    Any,
}

#[derive(Debug, Error, Eq, PartialEq)]
#[error("{0}")]
pub struct CoercionError(pub String);

impl SchemaType {
    /// Read the declared type of a property schema node.
    pub fn of(schema: &Map<String, Value>) -> SchemaType {
        match schema.get("type").and_then(Value::as_str) {
            Some("string") => SchemaType::String,
            Some("boolean") => SchemaType::Boolean,
            Some("integer") => SchemaType::Integer,
            Some("number") => SchemaType::Number,
            Some("object") => SchemaType::Object,
            Some("null") => SchemaType::Null,
            Some("array") => {
                let item = schema
                    .get("items")
                    .and_then(Value::as_object)
                    .map(SchemaType::of)
                    .unwrap_or(SchemaType::Any);
                SchemaType::Array(Box::new(item))
            }
            _ => SchemaType::Any,
        }
    }
}

impl fmt::Display for SchemaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaType::String => f.write_str("string"),
            SchemaType::Boolean => f.write_str("boolean"),
            SchemaType::Integer => f.write_str("integer"),
            SchemaType::Number => f.write_str("number"),
            SchemaType::Array(item) => write!(f, "array of {item}"),
            SchemaType::Object => f.write_str("object"),
            SchemaType::Null => f.write_str("null"),
            SchemaType::Any => f.write_str("any"),
        }
    }
}

/// Convert `value` into a literal of type `target`.
pub fn coerce_default(value: &Value, target: &SchemaType) -> Result<Value, CoercionError> {
    match target {
        SchemaType::Any => Ok(value.clone()),
        SchemaType::String => match value {
            Value::String(_) => Ok(value.clone()),
            Value::Number(n) => Ok(Value::String(n.to_string())),
            Value::Bool(b) => Ok(Value::String(b.to_string())),
            other => Err(mismatch(other, "a string")),
        },
        SchemaType::Boolean => match value {
            Value::Bool(_) => Ok(value.clone()),
            Value::String(text) => match text.trim().to_ascii_lowercase().as_str() {
                "true" => Ok(Value::Bool(true)),
                "false" => Ok(Value::Bool(false)),
                _ => Err(mismatch(value, "a boolean literal")),
            },
            other => Err(mismatch(other, "a boolean literal")),
        },
        SchemaType::Integer => match value {
            Value::Number(n) if n.is_i64() || n.is_u64() => Ok(value.clone()),
            Value::Number(n) => n
                .as_f64()
                .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
                .map(|f| Value::from(f as i64))
                .ok_or_else(|| mismatch(value, "an integer")),
            Value::String(text) => text
                .trim()
                .parse::<i64>()
                .map(Value::from)
                .map_err(|_| mismatch(value, "an integer")),
            other => Err(mismatch(other, "an integer")),
        },
        SchemaType::Number => match value {
            Value::Number(_) => Ok(value.clone()),
            Value::String(text) => text
                .trim()
                .parse::<f64>()
                .ok()
                .and_then(Number::from_f64)
                .map(Value::Number)
                .ok_or_else(|| mismatch(value, "a finite number")),
            other => Err(mismatch(other, "a finite number")),
        },
        SchemaType::Array(item) => match value {
            Value::Array(values) => values
                .iter()
                .map(|v| coerce_default(v, item))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array),
            Value::String(text) => text
                .split(',')
                .map(str::trim)
                .filter(|part| !part.is_empty())
                .map(|part| coerce_default(&Value::String(part.to_string()), item))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array),
            Value::Object(_) | Value::Null => Err(mismatch(value, "an array or list literal")),
            scalar => Ok(Value::Array(vec![coerce_default(scalar, item)?])),
        },
        SchemaType::Object => match value {
            Value::Object(_) => Ok(value.clone()),
            Value::String(text) => match serde_json::from_str::<Value>(text) {
                Ok(parsed @ Value::Object(_)) => Ok(parsed),
                _ => Err(mismatch(value, "a JSON object")),
            },
            other => Err(mismatch(other, "a JSON object")),
        },
        SchemaType::Null => match value {
            Value::Null => Ok(Value::Null),
            other => Err(mismatch(other, "null")),
        },
    }
}

fn mismatch(value: &Value, expected: &str) -> CoercionError {
    CoercionError(format!("{value} is not {expected}"))
}

//! Guard rails over produced catalogs.
//!
//! Catalogs ship to the editor without any further validation layer, so the
//! build re-checks its own output: each `propertiesSchema` must compile as a
//! JSON Schema, arrays must carry typed `items`, class annotations must sit on
//! string-typed nodes, and every emitted default must satisfy its property
//! schema. Problems are collected rather than short-circuited so one run
//! reports all of them.

use crate::catalog::{AggregateCatalog, Catalog, rules_for};
use crate::kind::EntityKind;
use jsonschema::JSONSchema;
use serde_json::{Map, Value};

pub fn validate_catalog(kind: EntityKind, catalog: &Catalog) -> Vec<String> {
    let mut errors = Vec::new();
    let rules = rules_for(kind);
    for (name, entry) in catalog.iter() {
        let display = format!("{kind} '{name}'");
        if rules.excludes(name) {
            errors.push(format!("{display} is excluded for this kind but present"));
        }

        let schema = Value::Object(entry.properties_schema.clone());
        if let Err(err) = JSONSchema::compile(&schema) {
            errors.push(format!("{display}: propertiesSchema does not compile: {err}"));
            continue;
        }

        if let Some(Value::Object(properties)) = entry.properties_schema.get("properties") {
            check_properties(&display, "", properties, &mut errors);
        }
    }
    errors
}

pub fn validate_aggregate(aggregate: &AggregateCatalog) -> Vec<String> {
    EntityKind::ALL
        .into_iter()
        .flat_map(|kind| validate_catalog(kind, aggregate.catalog(kind)))
        .collect()
}

fn check_properties(
    display: &str,
    prefix: &str,
    properties: &Map<String, Value>,
    errors: &mut Vec<String>,
) {
    for (property, node) in properties {
        if let Value::Object(node) = node {
            check_schema(display, &format!("{prefix}{property}"), node, errors);
        }
    }
}

/// Check one node, then everything nested under its `items` and `properties`.
fn check_schema(display: &str, path: &str, node: &Map<String, Value>, errors: &mut Vec<String>) {
    check_node(display, path, node, errors);
    if let Some(Value::Object(items)) = node.get("items") {
        check_schema(display, &format!("{path}[]"), items, errors);
    }
    if let Some(Value::Object(nested)) = node.get("properties") {
        check_properties(display, &format!("{path}."), nested, errors);
    }
}

fn check_node(display: &str, path: &str, node: &Map<String, Value>, errors: &mut Vec<String>) {
    if node.get("type").and_then(Value::as_str) == Some("array") {
        let item_type = node
            .get("items")
            .and_then(Value::as_object)
            .and_then(|items| items.get("type"))
            .and_then(Value::as_str);
        if item_type.is_none() {
            errors.push(format!(
                "{display} property '{path}' is an array without typed items"
            ));
        }
    }

    let is_class = node
        .get("$comment")
        .and_then(Value::as_str)
        .is_some_and(|comment| comment.starts_with("class:"));
    if is_class && node.get("type").and_then(Value::as_str) != Some("string") {
        errors.push(format!(
            "{display} property '{path}' has a class comment but is not string-typed"
        ));
    }

    if let Some(default) = node.get("default") {
        let mut schema = node.clone();
        schema.remove("default");
        let schema = Value::Object(schema);
        match JSONSchema::compile(&schema) {
            Ok(compiled) => {
                if !compiled.is_valid(default) {
                    errors.push(format!(
                        "{display} property '{path}' default {default} does not satisfy its schema"
                    ));
                }
            }
            Err(err) => errors.push(format!(
                "{display} property '{path}' schema does not compile: {err}"
            )),
        }
    }
}

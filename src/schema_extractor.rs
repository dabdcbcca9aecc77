//! Fragment lookup over the authoritative DSL schema document.
//!
//! The document keeps one definition per entity name under
//! [`SchemaLayout::definitions_pointer`]; each definition holds a model
//! sub-schema and a properties sub-schema. [`SchemaExtractor::fragment_for`]
//! returns both, with the properties sub-schema normalized so every property
//! carries a concrete `type`, every array an `items` descriptor, and local
//! `$ref`s are inlined so the fragment stands on its own.

use crate::config::SchemaLayout;
use serde_json::{Map, Value, json};
use thiserror::Error;

// Guards against pathological reference chains; recursive references are cut
// well before this is reached.
const MAX_REF_DEPTH: usize = 64;

/// Normalized schema for one entity.
#[derive(Clone, Debug, PartialEq)]
pub struct SchemaFragment {
    pub model: Map<String, Value>,
    pub properties_schema: Map<String, Value>,
}

/// Structural problem inside a fragment that exists but cannot be read.
#[derive(Debug, Error, Eq, PartialEq)]
#[error("{0}")]
pub struct FragmentError(pub String);

impl FragmentError {
    fn within(self, property: &str) -> Self {
        FragmentError(format!("property '{property}': {}", self.0))
    }
}

/// Stateless view over a parsed DSL schema document.
#[derive(Clone, Debug)]
pub struct SchemaExtractor<'a> {
    document: &'a Value,
    layout: SchemaLayout,
}

impl<'a> SchemaExtractor<'a> {
    pub fn new(document: &'a Value, layout: SchemaLayout) -> Self {
        Self { document, layout }
    }

    /// Entity names that have a definition, in document order.
    pub fn names(&self) -> Vec<&'a str> {
        self.definitions()
            .map(|defs| defs.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Look up and normalize the fragment for `name`.
    ///
    /// Returns `Ok(None)` when the definition, its model sub-schema or its
    /// properties sub-schema is missing; callers decide whether that is fatal.
    pub fn fragment_for(&self, name: &str) -> Result<Option<SchemaFragment>, FragmentError> {
        let Some(definition) = self.definitions().and_then(|defs| defs.get(name)) else {
            return Ok(None);
        };
        let (Some(model), Some(properties)) = (
            definition.get(&self.layout.model_key),
            definition.get(&self.layout.properties_key),
        ) else {
            return Ok(None);
        };

        let model = model.as_object().ok_or_else(|| {
            FragmentError(format!("'{}' must be an object", self.layout.model_key))
        })?;
        let mut properties_schema = properties.as_object().cloned().ok_or_else(|| {
            FragmentError(format!("'{}' must be an object", self.layout.properties_key))
        })?;

        let mut stack = Vec::new();
        self.normalize_node(&mut properties_schema, &mut stack)?;

        Ok(Some(SchemaFragment {
            model: model.clone(),
            properties_schema,
        }))
    }

    fn definitions(&self) -> Option<&'a Map<String, Value>> {
        self.document
            .pointer(&self.layout.definitions_pointer)
            .and_then(Value::as_object)
    }

    fn normalize_node(
        &self,
        node: &mut Map<String, Value>,
        stack: &mut Vec<String>,
    ) -> Result<(), FragmentError> {
        let depth = stack.len();
        self.inline_refs(node, stack)?;

        for combinator in ["oneOf", "anyOf"] {
            if let Some(Value::Array(branches)) = node.get_mut(combinator) {
                for branch in branches.iter_mut().filter_map(Value::as_object_mut) {
                    self.normalize_node(branch, stack)?;
                }
            }
        }

        if let Some(resolved) = resolve_type(node) {
            node.insert("type".to_string(), Value::String(resolved));
        }

        match node.get("type").and_then(Value::as_str) {
            Some("array") => self.normalize_items(node, stack)?,
            Some("object") => self.normalize_properties(node, stack)?,
            _ => {}
        }

        stack.truncate(depth);
        Ok(())
    }

    /// Inline the `$ref` chain starting at `node`, local keys taking
    /// precedence over earlier links and earlier links over later ones.
    ///
    /// The chain is resolved in full before anything is merged. A link
    /// already being expanded on the current path ends it: that target
    /// contributes only its type and labels, so nothing recursive is copied.
    fn inline_refs(
        &self,
        node: &mut Map<String, Value>,
        stack: &mut Vec<String>,
    ) -> Result<(), FragmentError> {
        let mut links: Vec<(String, &'a Map<String, Value>)> = Vec::new();
        let mut recursive: Option<&'a Map<String, Value>> = None;
        let mut next = node.remove("$ref");

        while let Some(reference) = next {
            let reference = reference
                .as_str()
                .ok_or_else(|| FragmentError("'$ref' must be a string".to_string()))?
                .to_string();
            let target = self.resolve_ref(&reference)?;

            if stack.contains(&reference) || links.iter().any(|(seen, _)| *seen == reference) {
                recursive = Some(target);
                break;
            }
            if stack.len() + links.len() >= MAX_REF_DEPTH {
                return Err(FragmentError(format!(
                    "'$ref' chain deeper than {MAX_REF_DEPTH} at '{reference}'"
                )));
            }

            next = target.get("$ref").cloned();
            links.push((reference, target));
        }

        for (reference, target) in links {
            for (key, value) in target {
                if key != "$ref" {
                    node.entry(key.as_str()).or_insert_with(|| value.clone());
                }
            }
            stack.push(reference);
        }

        if let Some(target) = recursive {
            for key in ["type", "title", "description"] {
                if let Some(value) = target.get(key) {
                    node.entry(key).or_insert_with(|| value.clone());
                }
            }
            if resolve_type(node).is_none() {
                if let Some(resolved) = resolve_type(target) {
                    node.insert("type".to_string(), Value::String(resolved));
                }
            }
        }
        Ok(())
    }

    fn resolve_ref(&self, reference: &str) -> Result<&'a Map<String, Value>, FragmentError> {
        reference
            .strip_prefix('#')
            .and_then(|pointer| self.document.pointer(pointer))
            .and_then(Value::as_object)
            .ok_or_else(|| FragmentError(format!("unresolvable '$ref' '{reference}'")))
    }

    fn normalize_properties(
        &self,
        node: &mut Map<String, Value>,
        stack: &mut Vec<String>,
    ) -> Result<(), FragmentError> {
        let Some(properties) = node.get_mut("properties") else {
            return Ok(());
        };
        let properties = properties
            .as_object_mut()
            .ok_or_else(|| FragmentError("'properties' must be an object".to_string()))?;
        for (name, property) in properties.iter_mut() {
            match property {
                Value::Object(schema) => self
                    .normalize_node(schema, stack)
                    .map_err(|err| err.within(name))?,
                // `true`/`false` schemas are valid and carry no type to resolve.
                Value::Bool(_) => {}
                _ => {
                    return Err(FragmentError(format!(
                        "property '{name}' must be a schema object"
                    )));
                }
            }
        }
        Ok(())
    }

    fn normalize_items(
        &self,
        node: &mut Map<String, Value>,
        stack: &mut Vec<String>,
    ) -> Result<(), FragmentError> {
        let items = match node.remove("items") {
            Some(Value::Object(items)) => items,
            // Tuple form: the first position describes the element.
            Some(Value::Array(mut positions)) if !positions.is_empty() => {
                match positions.swap_remove(0) {
                    Value::Object(items) => items,
                    _ => Map::new(),
                }
            }
            _ => Map::new(),
        };
        let mut items = items;
        self.normalize_node(&mut items, stack)
            .map_err(|err| FragmentError(format!("items: {}", err.0)))?;
        if !items.contains_key("type") {
            items.insert("type".to_string(), json!("string"));
        }
        node.insert("items".to_string(), Value::Object(items));
        Ok(())
    }
}

/// Resolve the JSON-Schema type a node declares or implies.
fn resolve_type(node: &Map<String, Value>) -> Option<String> {
    match node.get("type") {
        Some(Value::String(declared)) => return Some(declared.clone()),
        Some(Value::Array(declared)) => {
            return declared
                .iter()
                .filter_map(Value::as_str)
                .find(|t| *t != "null")
                .or_else(|| declared.iter().filter_map(Value::as_str).next())
                .map(str::to_string);
        }
        _ => {}
    }

    if let Some(Value::Array(values)) = node.get("enum") {
        return uniform(values.iter().map(literal_type));
    }
    if let Some(value) = node.get("const") {
        return literal_type(value);
    }
    for combinator in ["oneOf", "anyOf"] {
        if let Some(Value::Array(branches)) = node.get(combinator) {
            return uniform(
                branches
                    .iter()
                    .map(|branch| branch.as_object().and_then(resolve_type)),
            );
        }
    }
    if node.contains_key("properties") {
        return Some("object".to_string());
    }
    if node.contains_key("items") {
        return Some("array".to_string());
    }
    None
}

fn literal_type(value: &Value) -> Option<String> {
    let name = match value {
        Value::String(_) => "string",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_f64() => "number",
        Value::Number(_) => "integer",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
        Value::Null => "null",
    };
    Some(name.to_string())
}

/// The single type shared by every candidate, if there is one.
fn uniform(mut types: impl Iterator<Item = Option<String>>) -> Option<String> {
    let first = types.next()??;
    types.all(|t| t.as_deref() == Some(first.as_str())).then_some(first)
}

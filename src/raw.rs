//! Raw metadata entries as supplied by the source catalogs.
//!
//! A raw document carries a model block (under a kind-specific key such as
//! `component` or `dataformat`) and an optional `properties` block of display
//! metadata. Only the structure needed by the merge is checked here; the
//! blocks are otherwise echoed verbatim into the output catalogs.

use crate::catalog::rules::rules_for;
use crate::error::CatalogError;
use crate::kind::EntityKind;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

#[derive(Clone, Debug, PartialEq)]
pub struct RawEntry {
    pub name: String,
    pub model: Map<String, Value>,
    pub properties: Map<String, Value>,
}

impl RawEntry {
    /// Parse one raw entity document for `kind`.
    ///
    /// `origin` names the document (usually its file) for error messages when
    /// the entity name itself cannot be read.
    pub fn from_document(
        kind: EntityKind,
        document: &Value,
        origin: &str,
    ) -> Result<Self, CatalogError> {
        let model_key = rules_for(kind).model_key;
        let model = document
            .get(model_key)
            .and_then(Value::as_object)
            .ok_or_else(|| {
                CatalogError::malformed(kind, origin, format!("missing '{model_key}' object"))
            })?;

        let name = model
            .get("name")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .ok_or_else(|| {
                CatalogError::malformed(
                    kind,
                    origin,
                    format!("'{model_key}.name' must be a non-empty string"),
                )
            })?
            .to_string();

        let properties = match document.get("properties") {
            None | Some(Value::Null) => Map::new(),
            Some(Value::Object(properties)) => properties.clone(),
            Some(_) => {
                return Err(CatalogError::malformed(
                    kind,
                    name,
                    "'properties' must be an object",
                ));
            }
        };
        if let Some((property, _)) = properties.iter().find(|(_, meta)| !meta.is_object()) {
            return Err(CatalogError::malformed(
                kind,
                name,
                format!("property '{property}' metadata must be an object"),
            ));
        }

        Ok(Self {
            name,
            model: model.clone(),
            properties,
        })
    }

    pub fn title(&self) -> Option<&str> {
        self.model.get("title").and_then(Value::as_str)
    }
}

/// Raw entries for every kind, in source order.
#[derive(Clone, Debug, Default)]
pub struct RawCatalog {
    entries: BTreeMap<EntityKind, Vec<RawEntry>>,
}

impl RawCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, kind: EntityKind, entry: RawEntry) {
        self.entries.entry(kind).or_default().push(entry);
    }

    /// Entries for `kind`; empty when the source supplied none.
    pub fn entries(&self, kind: EntityKind) -> &[RawEntry] {
        self.entries.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn reads_model_block_under_kind_key() {
        let doc = json!({
            "dataformat": {"name": "custom", "title": "Custom", "kind": "model"},
            "properties": {"ref": {"displayName": "Ref", "type": "string"}}
        });
        let entry = RawEntry::from_document(EntityKind::DataFormat, &doc, "custom.json").unwrap();
        assert_eq!(entry.name, "custom");
        assert_eq!(entry.title(), Some("Custom"));
        assert_eq!(entry.properties["ref"]["displayName"], json!("Ref"));
    }

    #[test]
    fn patterns_use_the_model_block() {
        let doc = json!({"model": {"name": "choice", "title": "Choice"}});
        let entry = RawEntry::from_document(EntityKind::Pattern, &doc, "choice.json").unwrap();
        assert_eq!(entry.name, "choice");
        assert!(entry.properties.is_empty());
    }

    #[test]
    fn missing_model_block_is_malformed() {
        let doc = json!({"model": {"name": "sql"}});
        let err = RawEntry::from_document(EntityKind::Component, &doc, "sql.json").unwrap_err();
        match err {
            CatalogError::MalformedInput { kind, name, detail } => {
                assert_eq!(kind, EntityKind::Component);
                assert_eq!(name, "sql.json");
                assert!(detail.contains("component"));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn non_object_property_metadata_is_malformed() {
        let doc = json!({"language": {"name": "simple"}, "properties": {"trim": true}});
        let err = RawEntry::from_document(EntityKind::Language, &doc, "simple.json").unwrap_err();
        assert!(err.to_string().contains("'trim'"));
    }

    #[test]
    fn raw_catalog_keeps_source_order() {
        let mut raw = RawCatalog::new();
        for name in ["b", "a"] {
            let doc = json!({"model": {"name": name}});
            raw.push(
                EntityKind::Model,
                RawEntry::from_document(EntityKind::Model, &doc, name).unwrap(),
            );
        }
        let names: Vec<_> = raw
            .entries(EntityKind::Model)
            .iter()
            .map(|e| e.name.as_str())
            .collect();
        assert_eq!(names, ["b", "a"]);
        assert!(raw.entries(EntityKind::Pattern).is_empty());
    }
}

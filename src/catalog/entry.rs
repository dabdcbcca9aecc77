//! Merged catalog records and their serialized form.

use crate::error::CatalogError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// One entity after merging raw metadata with its schema fragment.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub model: Map<String, Value>,
    /// Raw display metadata, echoed verbatim.
    pub properties: Map<String, Value>,
    #[serde(rename = "propertiesSchema")]
    pub properties_schema: Map<String, Value>,
}

impl CatalogEntry {
    /// Schema node of one property, if the fragment declares it.
    pub fn property_schema(&self, name: &str) -> Option<&Map<String, Value>> {
        self.properties_schema
            .get("properties")
            .and_then(|props| props.get(name))
            .and_then(Value::as_object)
    }
}

/// Entity name to merged entry for one kind.
///
/// Keys are kept sorted so the serialized text is stable from run to run.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalog {
    entries: BTreeMap<String, CatalogEntry>,
}

impl Catalog {
    pub const fn empty() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&CatalogEntry> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CatalogEntry)> {
        self.entries.iter().map(|(name, entry)| (name.as_str(), entry))
    }

    /// Insert an entry; returns false (leaving the catalog unchanged) when
    /// the name is already taken.
    pub(crate) fn insert(&mut self, name: String, entry: CatalogEntry) -> bool {
        if self.entries.contains_key(&name) {
            return false;
        }
        self.entries.insert(name, entry);
        true
    }

    /// Serialize to JSON text. The same call backs standalone and aggregate
    /// output, which keeps the two byte-identical.
    pub fn to_text(&self, pretty: bool) -> Result<String, CatalogError> {
        let text = if pretty {
            serde_json::to_string_pretty(self)?
        } else {
            serde_json::to_string(self)?
        };
        Ok(text)
    }

    pub fn from_text(text: &str) -> Result<Self, CatalogError> {
        Ok(serde_json::from_str(text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entry(title: &str) -> CatalogEntry {
        CatalogEntry {
            model: json!({"title": title}).as_object().cloned().unwrap(),
            properties: Map::new(),
            properties_schema: json!({
                "title": title,
                "properties": {"uri": {"type": "string"}}
            })
            .as_object()
            .cloned()
            .unwrap(),
        }
    }

    #[test]
    fn serialized_shape_uses_editor_keys() {
        let mut catalog = Catalog::default();
        assert!(catalog.insert("log".into(), entry("Log")));
        let value: Value = serde_json::from_str(&catalog.to_text(false).unwrap()).unwrap();
        assert_eq!(value["log"]["propertiesSchema"]["title"], "Log");
        assert!(value["log"].get("properties_schema").is_none());
    }

    #[test]
    fn duplicate_names_are_refused() {
        let mut catalog = Catalog::default();
        assert!(catalog.insert("log".into(), entry("Log")));
        assert!(!catalog.insert("log".into(), entry("Other")));
        assert_eq!(catalog.get("log").unwrap().model["title"], "Log");
        assert_eq!(catalog.len(), 1);
    }

    #[test]
    fn pretty_and_compact_text_parse_to_the_same_catalog() {
        let mut catalog = Catalog::default();
        catalog.insert("b".into(), entry("B"));
        catalog.insert("a".into(), entry("A"));
        let compact = Catalog::from_text(&catalog.to_text(false).unwrap()).unwrap();
        let pretty = Catalog::from_text(&catalog.to_text(true).unwrap()).unwrap();
        assert_eq!(compact, catalog);
        assert_eq!(pretty, catalog);
        assert_eq!(catalog.names().collect::<Vec<_>>(), ["a", "b"]);
        assert_eq!(
            catalog.get("a").unwrap().property_schema("uri").unwrap()["type"],
            "string"
        );
    }
}

//! Per-kind merge of raw metadata with schema fragments.
//!
//! For each raw entry the merger drops excluded names, fetches the entity's
//! fragment, and assembles a [`CatalogEntry`]: the model blocks are unioned,
//! raw display properties are echoed, and the fragment's `propertiesSchema`
//! is enriched with the raw title, coerced defaults and class annotations.

use crate::catalog::entry::{Catalog, CatalogEntry};
use crate::catalog::rules::{STRUCTURAL_MODEL_FIELDS, rules_for};
use crate::coerce::{SchemaType, coerce_default};
use crate::config::{CatalogConfig, DefaultPolicy};
use crate::error::CatalogError;
use crate::kind::EntityKind;
use crate::raw::RawEntry;
use crate::schema_extractor::SchemaExtractor;
use crate::type_tag::TypeTag;
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

const CLASS_COMMENT_PREFIX: &str = "class:";

// Keywords that only make sense for structured values; a class reference is
// rendered as an opaque string, so they go.
const STRUCTURAL_KEYWORDS: &[&str] = &["items", "properties", "additionalProperties"];

/// Builds catalogs against one DSL schema document.
pub struct CatalogProcessor<'a> {
    extractor: SchemaExtractor<'a>,
    config: CatalogConfig,
}

impl<'a> CatalogProcessor<'a> {
    pub fn new(schema: &'a Value, config: CatalogConfig) -> Self {
        Self {
            extractor: SchemaExtractor::new(schema, config.layout.clone()),
            config,
        }
    }

    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    /// Merge every raw entry of `kind` into a catalog.
    ///
    /// Fails on the first entry without a fragment, with an unreadable
    /// fragment, with a duplicate name, or (under `FailFast`) with a default
    /// that does not fit its schema type. No partial catalog is returned.
    pub fn build_catalog(
        &self,
        kind: EntityKind,
        entries: &[RawEntry],
    ) -> Result<Catalog, CatalogError> {
        let rules = rules_for(kind);
        let mut catalog = Catalog::default();

        for raw in entries {
            if rules.excludes(&raw.name) {
                debug!(%kind, name = %raw.name, "skipping excluded entity");
                continue;
            }
            let entry = self.merge_entry(kind, raw)?;
            if !catalog.insert(raw.name.clone(), entry) {
                return Err(CatalogError::DuplicateEntity {
                    kind,
                    name: raw.name.clone(),
                });
            }
            debug!(%kind, name = %raw.name, "merged entity");
        }

        if catalog.is_empty() {
            warn!(%kind, "catalog has no entries");
        }
        info!(%kind, entries = catalog.len(), "catalog assembled");
        Ok(catalog)
    }

    /// Merge one raw entry with its fragment.
    pub fn merge_entry(
        &self,
        kind: EntityKind,
        raw: &RawEntry,
    ) -> Result<CatalogEntry, CatalogError> {
        let fragment = self
            .extractor
            .fragment_for(&raw.name)
            .map_err(|err| {
                CatalogError::malformed(kind, &raw.name, format!("schema fragment: {err}"))
            })?
            .ok_or_else(|| CatalogError::MissingFragment {
                kind,
                name: raw.name.clone(),
            })?;

        let model = merge_model(&raw.model, &fragment.model);
        let properties_schema = self.enrich_schema(kind, raw, fragment.properties_schema)?;

        Ok(CatalogEntry {
            model,
            properties: raw.properties.clone(),
            properties_schema,
        })
    }

    fn enrich_schema(
        &self,
        kind: EntityKind,
        raw: &RawEntry,
        mut schema: Map<String, Value>,
    ) -> Result<Map<String, Value>, CatalogError> {
        if let Some(title) = raw.title() {
            schema.insert("title".to_string(), Value::String(title.to_string()));
        }

        if let Some(Value::Object(schema_properties)) = schema.get_mut("properties") {
            // Raw-only properties stay display metadata; they never gain a schema entry.
            for (property, meta) in &raw.properties {
                let (Some(meta), Some(slot)) =
                    (meta.as_object(), schema_properties.get_mut(property))
                else {
                    continue;
                };
                // `true` accepts anything, same as `{}`, and can carry annotations.
                if *slot == Value::Bool(true) {
                    *slot = Value::Object(Map::new());
                }
                let Value::Object(node) = slot else {
                    continue;
                };
                self.enrich_property(kind, &raw.name, property, meta, node)?;
            }
        }
        Ok(schema)
    }

    fn enrich_property(
        &self,
        kind: EntityKind,
        name: &str,
        property: &str,
        meta: &Map<String, Value>,
        node: &mut Map<String, Value>,
    ) -> Result<(), CatalogError> {
        fill_missing(node, "title", meta.get("displayName"));
        fill_missing(node, "description", meta.get("description"));

        match TypeTag::from_property(meta) {
            Some(TypeTag::ClassRef(class)) => mark_class_reference(node, &class),
            Some(TypeTag::Collection(element)) if is_array(node) => {
                if let (TypeTag::ClassRef(class), Some(Value::Object(items))) =
                    (element.as_ref(), node.get_mut("items"))
                {
                    mark_class_reference(items, class);
                }
            }
            _ => {}
        }

        let Some(raw_default) = meta
            .get("defaultValue")
            .or_else(|| meta.get("default"))
            .filter(|value| !value.is_null())
        else {
            return Ok(());
        };
        let declared = SchemaType::of(node);
        match coerce_default(raw_default, &declared) {
            Ok(value) => {
                node.insert("default".to_string(), value);
            }
            Err(err) => match self.config.default_policy {
                DefaultPolicy::FailFast => {
                    return Err(CatalogError::TypeCoercion {
                        kind,
                        name: name.to_string(),
                        property: property.to_string(),
                        expected: declared,
                        value: raw_default.to_string(),
                        reason: err.to_string(),
                    });
                }
                DefaultPolicy::DropDefault => {
                    warn!(
                        %kind,
                        name,
                        property,
                        reason = %err,
                        "dropping default that does not fit its schema type"
                    );
                }
            },
        }
        Ok(())
    }
}

/// Union of both model blocks: raw descriptive fields win, structural fields
/// come from the fragment when it has them.
fn merge_model(raw: &Map<String, Value>, fragment: &Map<String, Value>) -> Map<String, Value> {
    let mut model = fragment.clone();
    for (key, value) in raw {
        if STRUCTURAL_MODEL_FIELDS.contains(&key.as_str()) && model.contains_key(key) {
            continue;
        }
        model.insert(key.clone(), value.clone());
    }
    model
}

fn mark_class_reference(node: &mut Map<String, Value>, class: &str) {
    for keyword in STRUCTURAL_KEYWORDS {
        node.remove(*keyword);
    }
    node.insert("type".to_string(), Value::String("string".to_string()));
    node.insert(
        "$comment".to_string(),
        Value::String(format!("{CLASS_COMMENT_PREFIX}{class}")),
    );
}

fn is_array(node: &Map<String, Value>) -> bool {
    node.get("type").and_then(Value::as_str) == Some("array")
}

fn fill_missing(node: &mut Map<String, Value>, key: &str, value: Option<&Value>) {
    if let Some(value) = value.filter(|v| v.as_str().is_some_and(|s| !s.is_empty())) {
        node.entry(key).or_insert_with(|| value.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn schema() -> Value {
        json!({
            "definitions": {
                "sql": {
                    "model": {"kind": "component", "name": "sql"},
                    "propertiesSchema": {
                        "type": "object",
                        "properties": {
                            "dataSource": {"type": "object", "title": "Data Source"},
                            "bridgeErrorHandler": {
                                "type": "boolean",
                                "title": "Bridge Error Handler"
                            },
                            "processors": {"type": "array"},
                            "batch": {"type": "boolean"},
                            "schemaOnly": {"type": "string", "title": "Schema Only"}
                        }
                    }
                }
            }
        })
    }

    fn sql_entry(batch_default: Value) -> RawEntry {
        let doc = json!({
            "component": {
                "name": "sql",
                "title": "SQL",
                "kind": "raw-kind",
                "label": "database"
            },
            "properties": {
                "dataSource": {
                    "displayName": "Data Source",
                    "type": "object",
                    "javaType": "javax.sql.DataSource"
                },
                "bridgeErrorHandler": {
                    "displayName": "Bridge Error Handler",
                    "type": "boolean",
                    "defaultValue": "false"
                },
                "processors": {
                    "type": "array",
                    "javaType": "java.util.List<org.apache.camel.Processor>"
                },
                "batch": {
                    "displayName": "Batch",
                    "description": "Enable batch mode",
                    "type": "boolean",
                    "defaultValue": batch_default
                },
                "rawOnly": {"displayName": "Raw Only", "type": "string"}
            }
        });
        RawEntry::from_document(EntityKind::Component, &doc, "sql.json").unwrap()
    }

    #[test]
    fn class_references_and_textual_booleans() {
        let doc = schema();
        let processor = CatalogProcessor::new(&doc, CatalogConfig::default());
        let entry = processor
            .merge_entry(EntityKind::Component, &sql_entry(json!("true")))
            .unwrap();

        let data_source = entry.property_schema("dataSource").unwrap();
        assert_eq!(data_source["type"], "string");
        assert_eq!(data_source["$comment"], "class:javax.sql.DataSource");

        let beh = entry.property_schema("bridgeErrorHandler").unwrap();
        assert_eq!(beh["default"], json!(false));

        let processors = entry.property_schema("processors").unwrap();
        assert_eq!(processors["type"], "array");
        assert_eq!(processors["items"]["$comment"], "class:org.apache.camel.Processor");
        assert_eq!(processors["items"]["type"], "string");
    }

    #[test]
    fn permissive_schema_is_annotated_for_class_references() {
        let doc = json!({
            "definitions": {
                "jdbc": {
                    "model": {"kind": "component"},
                    "propertiesSchema": {"properties": {"dataSource": true, "options": true}}
                }
            }
        });
        let raw = json!({
            "component": {"name": "jdbc"},
            "properties": {
                "dataSource": {"type": "object", "javaType": "javax.sql.DataSource"}
            }
        });
        let raw = RawEntry::from_document(EntityKind::Component, &raw, "jdbc.json").unwrap();
        let processor = CatalogProcessor::new(&doc, CatalogConfig::default());
        let entry = processor.merge_entry(EntityKind::Component, &raw).unwrap();

        let data_source = entry.property_schema("dataSource").unwrap();
        assert_eq!(data_source["type"], "string");
        assert_eq!(data_source["$comment"], "class:javax.sql.DataSource");
        assert_eq!(entry.properties_schema["properties"]["options"], json!(true));
    }

    #[test]
    fn model_and_titles_are_merged() {
        let doc = schema();
        let processor = CatalogProcessor::new(&doc, CatalogConfig::default());
        let entry = processor
            .merge_entry(EntityKind::Component, &sql_entry(json!(true)))
            .unwrap();

        assert_eq!(entry.model["kind"], "component");
        assert_eq!(entry.model["title"], "SQL");
        assert_eq!(entry.model["label"], "database");
        assert_eq!(entry.properties_schema["title"], "SQL");

        let batch = entry.property_schema("batch").unwrap();
        assert_eq!(batch["title"], "Batch");
        assert_eq!(batch["description"], "Enable batch mode");
        assert_eq!(entry.property_schema("dataSource").unwrap()["title"], "Data Source");
        assert_eq!(entry.property_schema("schemaOnly").unwrap()["title"], "Schema Only");

        assert!(entry.properties.contains_key("rawOnly"));
        assert!(entry.property_schema("rawOnly").is_none());
    }

    #[test]
    fn bad_default_fails_fast_by_default() {
        let doc = schema();
        let processor = CatalogProcessor::new(&doc, CatalogConfig::default());
        let err = processor
            .merge_entry(EntityKind::Component, &sql_entry(json!("{{batch}}")))
            .unwrap_err();
        match err {
            CatalogError::TypeCoercion { kind, name, property, expected, .. } => {
                assert_eq!(kind, EntityKind::Component);
                assert_eq!(name, "sql");
                assert_eq!(property, "batch");
                assert_eq!(expected, SchemaType::Boolean);
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn bad_default_is_dropped_under_lenient_policy() {
        let doc = schema();
        let config = CatalogConfig {
            default_policy: DefaultPolicy::DropDefault,
            ..CatalogConfig::default()
        };
        let processor = CatalogProcessor::new(&doc, config);
        let entry = processor
            .merge_entry(EntityKind::Component, &sql_entry(json!("{{batch}}")))
            .unwrap();
        let batch = entry.property_schema("batch").unwrap();
        assert!(batch.get("default").is_none());
        assert_eq!(batch["type"], "boolean");
    }

    #[test]
    fn missing_fragment_aborts_the_catalog() {
        let doc = schema();
        let processor = CatalogProcessor::new(&doc, CatalogConfig::default());
        let orphan = RawEntry::from_document(
            EntityKind::Component,
            &json!({"component": {"name": "orphan"}}),
            "orphan.json",
        )
        .unwrap();
        let err = processor
            .build_catalog(EntityKind::Component, &[sql_entry(json!(true)), orphan])
            .unwrap_err();
        match err {
            CatalogError::MissingFragment { kind, name } => {
                assert_eq!(kind, EntityKind::Component);
                assert_eq!(name, "orphan");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn duplicate_names_abort_the_catalog() {
        let doc = schema();
        let processor = CatalogProcessor::new(&doc, CatalogConfig::default());
        let err = processor
            .build_catalog(
                EntityKind::Component,
                &[sql_entry(json!(true)), sql_entry(json!(false))],
            )
            .unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateEntity { .. }));
    }

    #[test]
    fn structural_model_fields_fall_back_to_raw() {
        let raw = json!({"kind": "model", "title": "Raw"});
        let fragment = json!({"name": "x", "title": "Schema"});
        let merged = merge_model(raw.as_object().unwrap(), fragment.as_object().unwrap());
        assert_eq!(merged["kind"], "model");
        assert_eq!(merged["title"], "Raw");
        assert_eq!(merged["name"], "x");
    }
}

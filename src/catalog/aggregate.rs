//! All five catalogs built in one run, plus their serialized text.
//!
//! Each kind's text is produced once by [`Catalog::to_text`] and shared by the
//! standalone accessor and the aggregate view, so the two cannot drift.

use crate::catalog::entry::Catalog;
use crate::catalog::merge::CatalogProcessor;
use crate::error::CatalogError;
use crate::kind::EntityKind;
use crate::raw::RawCatalog;
use serde_json::{Map, Value, json};
use std::collections::BTreeMap;

#[derive(Clone, Debug)]
pub struct AggregateCatalog {
    catalogs: BTreeMap<EntityKind, Catalog>,
    texts: BTreeMap<EntityKind, String>,
}

impl AggregateCatalog {
    pub fn catalog(&self, kind: EntityKind) -> &Catalog {
        // Construction inserts every kind, so the fallback is never used.
        self.catalogs.get(&kind).unwrap_or(&EMPTY)
    }

    /// Serialized catalog for one kind.
    pub fn text(&self, kind: EntityKind) -> &str {
        self.texts.get(&kind).map(String::as_str).unwrap_or_default()
    }

    /// Catalog name (`components`, `dataformats`, ...) to serialized catalog.
    pub fn texts(&self) -> BTreeMap<&'static str, &str> {
        self.texts
            .iter()
            .map(|(kind, text)| (kind.catalog_name(), text.as_str()))
            .collect()
    }

    /// The whole aggregate as one JSON object of catalog name to catalog text.
    pub fn to_text(&self) -> Result<String, CatalogError> {
        Ok(serde_json::to_string(&self.texts())?)
    }

    /// Summary of the aggregate: output file and entry count per catalog.
    pub fn index(&self, file_name: impl Fn(EntityKind) -> String) -> Value {
        let catalogs: Map<String, Value> = EntityKind::ALL
            .into_iter()
            .map(|kind| {
                (
                    kind.catalog_name().to_string(),
                    json!({
                        "file": file_name(kind),
                        "entries": self.catalog(kind).len(),
                    }),
                )
            })
            .collect();
        json!({
            "generator": concat!(env!("CARGO_PKG_NAME"), " ", env!("CARGO_PKG_VERSION")),
            "catalogs": catalogs,
        })
    }
}

static EMPTY: Catalog = Catalog::empty();

impl<'a> CatalogProcessor<'a> {
    /// Build and serialize the catalog for a single kind.
    pub fn catalog_text(
        &self,
        kind: EntityKind,
        raw: &RawCatalog,
    ) -> Result<String, CatalogError> {
        self.build_catalog(kind, raw.entries(kind))?
            .to_text(self.config().pretty)
    }

    /// Build all five catalogs. The first failing kind aborts the run.
    pub fn process_catalog(&self, raw: &RawCatalog) -> Result<AggregateCatalog, CatalogError> {
        let mut catalogs = BTreeMap::new();
        let mut texts = BTreeMap::new();
        for kind in EntityKind::ALL {
            let catalog = self.build_catalog(kind, raw.entries(kind))?;
            texts.insert(kind, catalog.to_text(self.config().pretty)?);
            catalogs.insert(kind, catalog);
        }
        Ok(AggregateCatalog { catalogs, texts })
    }
}

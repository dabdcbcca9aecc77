//! Catalog builder for a schema-aware DSL editor.
//!
//! Raw metadata about the DSL's building blocks (components, data formats,
//! languages, models and patterns) disagrees with the authoritative DSL JSON
//! Schema on types, defaults and naming. This crate merges the two into five
//! uniformly-shaped catalogs: `schema_extractor` pulls a normalized fragment
//! per entity out of the schema document, `catalog` merges fragments with raw
//! entries under per-kind rules, and `loader`/`validation` cover the build
//! harness around that pure transform.

pub mod catalog;
pub mod coerce;
pub mod config;
pub mod error;
pub mod kind;
pub mod loader;
pub mod raw;
pub mod schema_extractor;
pub mod type_tag;
pub mod validation;

pub use catalog::{AggregateCatalog, Catalog, CatalogEntry, CatalogProcessor, rules_for};
pub use coerce::{SchemaType, coerce_default};
pub use config::{CatalogConfig, DefaultPolicy, SchemaLayout};
pub use error::CatalogError;
pub use kind::EntityKind;
pub use loader::{load_dsl_schema, load_raw_catalog, write_catalogs};
pub use raw::{RawCatalog, RawEntry};
pub use schema_extractor::{FragmentError, SchemaExtractor, SchemaFragment};
pub use type_tag::TypeTag;
pub use validation::{validate_aggregate, validate_catalog};

use tracing_subscriber::EnvFilter;

/// Install the stderr log subscriber used by the binaries.
///
/// `RUST_LOG` selects the filter; without it only `info` and above are shown.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    // A second call (tests, embedding) keeps the first subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

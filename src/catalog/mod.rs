//! Catalog assembly.
//!
//! `merge` turns raw entries plus schema fragments into per-kind catalogs,
//! `rules` holds the kind-indexed normalization table, `entry` defines the
//! merged record shape, and `aggregate` runs all kinds and serializes them.

pub mod aggregate;
pub mod entry;
pub mod merge;
pub mod rules;

pub use aggregate::AggregateCatalog;
pub use entry::{Catalog, CatalogEntry};
pub use merge::CatalogProcessor;
pub use rules::{KindRules, rules_for};

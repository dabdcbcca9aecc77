//! Filesystem loading of the raw catalogs and the DSL schema, and writing of
//! the produced catalogs.
//!
//! Raw metadata lives in one directory per kind (`components/`,
//! `dataformats/`, ...) holding one JSON document per entity. Files are read
//! in sorted path order so runs are reproducible regardless of directory
//! iteration order.

use crate::catalog::AggregateCatalog;
use crate::kind::EntityKind;
use crate::raw::{RawCatalog, RawEntry};
use anyhow::{Context, Result, bail};
use serde_json::Value;
use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const INDEX_FILE: &str = "index.json";

/// Read and parse the DSL schema document.
pub fn load_dsl_schema(path: &Path) -> Result<Value> {
    let file = File::open(path).with_context(|| format!("opening schema {}", path.display()))?;
    let schema: Value = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("parsing schema {}", path.display()))?;
    if !schema.is_object() {
        bail!("schema {} must be a JSON object", path.display());
    }
    Ok(schema)
}

/// Load every kind's raw entries from `root/<catalog-name>/`.
///
/// A missing kind directory is an error: shipping an empty catalog because a
/// directory was misnamed would go unnoticed downstream.
pub fn load_raw_catalog(root: &Path) -> Result<RawCatalog> {
    let mut raw = RawCatalog::new();
    for kind in EntityKind::ALL {
        let dir = root.join(kind.catalog_name());
        if !dir.is_dir() {
            bail!(
                "raw catalog directory for {kind} not found at {}",
                dir.display()
            );
        }
        let files = collect_json_files(&dir)?;
        debug!(%kind, files = files.len(), dir = %dir.display(), "loading raw entries");
        for path in files {
            raw.push(kind, load_raw_entry(kind, &path)?);
        }
    }
    Ok(raw)
}

/// Parse one raw entity document.
pub fn load_raw_entry(kind: EntityKind, path: &Path) -> Result<RawEntry> {
    let data = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let document: Value = serde_json::from_str(&data)
        .with_context(|| format!("parsing {}", path.display()))?;
    let origin = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    Ok(RawEntry::from_document(kind, &document, &origin)?)
}

fn collect_json_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    collect_json(dir, &mut files)?;
    files.sort();
    Ok(files)
}

fn collect_json(dir: &Path, acc: &mut Vec<PathBuf>) -> Result<()> {
    for entry in fs::read_dir(dir).with_context(|| format!("listing {}", dir.display()))? {
        let entry = entry?;
        let path = entry.path();
        if path.is_dir() {
            collect_json(&path, acc)?;
        } else if path.extension().and_then(|ext| ext.to_str()) == Some("json") {
            acc.push(path);
        }
    }
    Ok(())
}

/// Output file name for one kind's catalog.
pub fn catalog_file_name(kind: EntityKind) -> String {
    format!("{}.json", kind.catalog_name())
}

/// Write each kind's catalog text plus an index into `out_dir`.
///
/// Returns the written paths, index last.
pub fn write_catalogs(aggregate: &AggregateCatalog, out_dir: &Path) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(out_dir)
        .with_context(|| format!("creating output directory {}", out_dir.display()))?;

    let mut written = Vec::new();
    for kind in EntityKind::ALL {
        let path = out_dir.join(catalog_file_name(kind));
        fs::write(&path, aggregate.text(kind))
            .with_context(|| format!("writing {}", path.display()))?;
        written.push(path);
    }

    let index_path = out_dir.join(INDEX_FILE);
    let index = aggregate.index(catalog_file_name);
    fs::write(&index_path, serde_json::to_string_pretty(&index)?)
        .with_context(|| format!("writing {}", index_path.display()))?;
    written.push(index_path);
    Ok(written)
}

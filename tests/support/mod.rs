use anyhow::{Context, Result, bail};
use dsl_catalog::{
    AggregateCatalog, CatalogConfig, CatalogProcessor, RawCatalog, load_dsl_schema,
    load_raw_catalog,
};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

pub fn fixtures_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests").join("fixtures")
}

pub fn schema_path() -> PathBuf {
    fixtures_root().join("dsl-schema.json")
}

pub fn raw_root() -> PathBuf {
    fixtures_root().join("raw")
}

pub fn fixture_schema() -> Result<Value> {
    load_dsl_schema(&schema_path())
}

pub fn fixture_raw() -> Result<RawCatalog> {
    load_raw_catalog(&raw_root())
}

/// Build the full aggregate from the fixtures with `config`.
pub fn build_fixture_aggregate(config: CatalogConfig) -> Result<AggregateCatalog> {
    let schema = fixture_schema()?;
    let raw = fixture_raw()?;
    let processor = CatalogProcessor::new(&schema, config);
    processor
        .process_catalog(&raw)
        .context("processing fixture catalogs")
}

/// Number of `*.json` files directly under one raw kind directory.
pub fn raw_file_count(dir_name: &str) -> Result<usize> {
    let dir = raw_root().join(dir_name);
    let mut count = 0;
    for entry in std::fs::read_dir(&dir).with_context(|| format!("listing {}", dir.display()))? {
        let path = entry?.path();
        if path.extension().and_then(|ext| ext.to_str()) == Some("json") {
            count += 1;
        }
    }
    Ok(count)
}

pub fn run_command(mut cmd: Command) -> Result<Output> {
    let output = cmd
        .output()
        .with_context(|| format!("failed to run command: {:?}", cmd))?;
    if output.status.success() {
        Ok(output)
    } else {
        bail!(
            "command {:?} failed: status {:?}\nstdout: {}\nstderr: {}",
            cmd,
            output.status.code(),
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        )
    }
}

//! Builds the five editor catalogs from a DSL schema and a raw catalog tree.
//!
//! Loads the schema document and the per-kind raw entries, merges them, checks
//! the result, and writes one JSON file per kind plus `index.json` into the
//! output directory. Any missing fragment, unreadable record or (by default)
//! uncoercible default aborts the run before anything is written.

use anyhow::{Context, Result, bail};
use dsl_catalog::{
    CatalogConfig, CatalogProcessor, DefaultPolicy, init_logging, load_dsl_schema,
    load_raw_catalog, validate_aggregate, write_catalogs,
};
use std::env;
use std::path::PathBuf;
use tracing::info;

fn main() {
    init_logging();
    if let Err(err) = run() {
        eprintln!("{err:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let args = CliArgs::parse()?;
    let mut config = CatalogConfig::from_env();
    if args.pretty {
        config.pretty = true;
    }
    if args.drop_bad_defaults {
        config.default_policy = DefaultPolicy::DropDefault;
    }

    let schema = load_dsl_schema(&args.schema)?;
    let raw = load_raw_catalog(&args.raw)
        .with_context(|| format!("loading raw catalog from {}", args.raw.display()))?;

    let processor = CatalogProcessor::new(&schema, config);
    let aggregate = processor
        .process_catalog(&raw)
        .context("building catalogs")?;

    if !args.skip_validation {
        let problems = validate_aggregate(&aggregate);
        if !problems.is_empty() {
            bail!(
                "produced catalogs failed validation:\n{}",
                problems.join("\n")
            );
        }
    }

    let written = write_catalogs(&aggregate, &args.out)?;
    for path in &written {
        info!(path = %path.display(), "wrote catalog file");
    }
    Ok(())
}

struct CliArgs {
    schema: PathBuf,
    raw: PathBuf,
    out: PathBuf,
    pretty: bool,
    drop_bad_defaults: bool,
    skip_validation: bool,
}

impl CliArgs {
    fn parse() -> Result<Self> {
        let mut args = env::args_os().skip(1);
        let mut schema: Option<PathBuf> = None;
        let mut raw: Option<PathBuf> = None;
        let mut out: Option<PathBuf> = None;
        let mut pretty = false;
        let mut drop_bad_defaults = false;
        let mut skip_validation = false;

        while let Some(arg_os) = args.next() {
            let arg = arg_os
                .into_string()
                .map_err(|_| anyhow::anyhow!("argument is not valid UTF-8"))?;
            match arg.as_str() {
                "--schema" => schema = Some(PathBuf::from(next_value(&mut args, "--schema")?)),
                "--raw" => raw = Some(PathBuf::from(next_value(&mut args, "--raw")?)),
                "--out" => out = Some(PathBuf::from(next_value(&mut args, "--out")?)),
                "--pretty" => pretty = true,
                "--drop-bad-defaults" => drop_bad_defaults = true,
                "--skip-validation" => skip_validation = true,
                "--help" | "-h" => {
                    print!("{}", usage());
                    std::process::exit(0);
                }
                other => bail!("unknown flag: {other}\n{}", usage()),
            }
        }

        let (Some(schema), Some(raw), Some(out)) = (schema, raw, out) else {
            bail!("--schema, --raw and --out are required\n{}", usage());
        };
        Ok(CliArgs {
            schema,
            raw,
            out,
            pretty,
            drop_bad_defaults,
            skip_validation,
        })
    }
}

fn next_value(args: &mut impl Iterator<Item = std::ffi::OsString>, flag: &str) -> Result<String> {
    args.next()
        .map(|os| {
            os.into_string()
                .map_err(|_| anyhow::anyhow!("value for {flag} is not valid UTF-8"))
        })
        .transpose()?
        .ok_or_else(|| anyhow::anyhow!("missing value for {flag}"))
}

fn usage() -> &'static str {
    "Usage: build-catalog --schema FILE --raw DIR --out DIR \
[--pretty] [--drop-bad-defaults] [--skip-validation]\n\
Merges raw DSL metadata (DIR/components, DIR/dataformats, DIR/languages, DIR/models, \
DIR/patterns) with the DSL schema and writes one catalog per kind plus index.json.\n"
}

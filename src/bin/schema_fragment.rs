//! Prints the normalized schema fragment for one entity name.
//!
//! Useful when a catalog build reports a missing or malformed fragment: the
//! output is exactly what the merge step starts from. `--list` prints every
//! entity name the schema defines instead.

use anyhow::{Result, anyhow, bail};
use dsl_catalog::{CatalogConfig, SchemaExtractor, load_dsl_schema};
use serde_json::json;
use std::env;
use std::path::PathBuf;

fn main() {
    if let Err(err) = run() {
        eprintln!("{err:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let args = CliArgs::parse()?;
    let config = CatalogConfig::from_env();
    let schema = load_dsl_schema(&args.schema)?;
    let extractor = SchemaExtractor::new(&schema, config.layout);

    let Some(name) = args.name else {
        for name in extractor.names() {
            println!("{name}");
        }
        return Ok(());
    };

    let fragment = extractor
        .fragment_for(&name)
        .map_err(|err| anyhow!("fragment for '{name}' is malformed: {err}"))?
        .ok_or_else(|| anyhow!("no fragment for '{name}' in {}", args.schema.display()))?;
    let output = json!({
        "model": fragment.model,
        "propertiesSchema": fragment.properties_schema,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

struct CliArgs {
    schema: PathBuf,
    /// `None` lists all names.
    name: Option<String>,
}

impl CliArgs {
    fn parse() -> Result<Self> {
        let mut args = env::args().skip(1);
        let mut schema: Option<PathBuf> = None;
        let mut name: Option<String> = None;
        let mut list = false;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--schema" => {
                    schema = Some(PathBuf::from(
                        args.next().ok_or_else(|| anyhow!("missing value for --schema"))?,
                    ))
                }
                "--name" => {
                    name = Some(args.next().ok_or_else(|| anyhow!("missing value for --name"))?)
                }
                "--list" => list = true,
                "--help" | "-h" => {
                    print!("{}", usage());
                    std::process::exit(0);
                }
                other => bail!("unknown flag: {other}\n{}", usage()),
            }
        }

        let schema = schema.ok_or_else(|| anyhow!("--schema is required\n{}", usage()))?;
        match (name, list) {
            (Some(_), true) => bail!("--name and --list are mutually exclusive"),
            (None, false) => bail!("one of --name or --list is required\n{}", usage()),
            (name, _) => Ok(CliArgs { schema, name }),
        }
    }
}

fn usage() -> &'static str {
    "Usage: schema-fragment --schema FILE (--name NAME | --list)\n\
Prints the normalized model and propertiesSchema for NAME, or every defined entity name.\n"
}

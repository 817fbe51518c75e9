//! Schema Map CLI
//!
//! Builds the composed schema map and inspects it.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use books_schemas::config::{read_custom_fields, OutputFormat};
use books_schemas::{EngineConfig, LayerRegistry, SchemaBuilder, SchemaMap};
use clap::{Parser, Subcommand};
use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "schema-map")]
#[command(about = "Build and inspect the composed document schema map")]
struct Cli {
    /// Config file (defaults to books-schemas.toml lookup)
    #[arg(short, long)]
    config: Option<String>,

    /// Declaration tree to load instead of the embedded one
    #[arg(short, long)]
    schema_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args)]
struct BuildArgs {
    /// Country code of the regional layer
    #[arg(short = 'C', long)]
    country: Option<String>,

    /// JSON array of custom-field records
    #[arg(long)]
    custom_fields: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the map and write it as JSON
    Build {
        #[command(flatten)]
        args: BuildArgs,
        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Print skipped input after building
        #[arg(long)]
        report: bool,
    },

    /// Show the fields of one schema
    Show {
        schema: String,
        #[command(flatten)]
        args: BuildArgs,
    },

    /// Fuzzy search schema names and labels
    Search {
        query: String,
        #[arg(short, long, default_value = "10")]
        limit: usize,
    },

    /// List country codes with regional overrides
    Countries,

    /// Print the fingerprint of a build
    Fingerprint {
        #[command(flatten)]
        args: BuildArgs,
    },

    /// Print the effective configuration as TOML
    Config {
        /// Also write it to this path
        #[arg(long)]
        save: Option<String>,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = EngineConfig::load_from(cli.config.as_deref()).context("loading configuration")?;
    if let Some(dir) = cli.schema_dir {
        config.registry.schema_dir = Some(dir);
    }
    let registry = config.load_registry().context("loading schema declarations")?;

    match cli.command {
        Commands::Build { args, output, report } => {
            let (map, diagnostics) = builder(&registry, &config, &args)
                .build_with_report(&custom_fields(&config, &args)?);
            let json = match config.output.format {
                OutputFormat::Pretty => serde_json::to_string_pretty(map.as_ref())?,
                OutputFormat::Compact => serde_json::to_string(map.as_ref())?,
            };

            match output {
                Some(path) => {
                    fs::write(&path, json).with_context(|| format!("writing {}", path.display()))?;
                    println!("Wrote {} schemas to {}", map.len(), path.display());
                }
                None => println!("{}", json),
            }

            if report {
                if diagnostics.is_empty() {
                    eprintln!("No input skipped");
                } else {
                    eprintln!("{}", diagnostics.format_all());
                }
            }
        }

        Commands::Show { schema, args } => {
            let map = builder(&registry, &config, &args).build(&custom_fields(&config, &args)?);
            print_schema(&map, &schema)?;
        }

        Commands::Search { query, limit } => {
            let map = SchemaBuilder::from_config(&registry, &config).build(&[]);
            let matcher = SkimMatcherV2::default();
            let mut hits: Vec<(i64, &str, &str)> = map
                .document_schemas()
                .filter_map(|s| {
                    let by_name = matcher.fuzzy_match(&s.name, &query);
                    let by_label = matcher.fuzzy_match(&s.label, &query);
                    by_name.max(by_label).map(|score| (score, s.name.as_str(), s.label.as_str()))
                })
                .collect();
            hits.sort_by(|a, b| b.0.cmp(&a.0));

            if hits.is_empty() {
                println!("No schemas match '{}'", query);
            }
            for (score, name, label) in hits.into_iter().take(limit) {
                println!("{:>4}  {:<24} {}", score, name, label);
            }
        }

        Commands::Countries => {
            for code in registry.countries() {
                println!("{}", code);
            }
        }

        Commands::Fingerprint { args } => {
            let map = builder(&registry, &config, &args).build(&custom_fields(&config, &args)?);
            println!("{}  {} ({} schemas)", map.fingerprint(), map.country_code(), map.len());
        }

        Commands::Config { save } => {
            println!("{}", toml::to_string_pretty(&config)?);
            if let Some(path) = save {
                config.save(&path).with_context(|| format!("saving {}", path))?;
            }
        }
    }

    Ok(())
}

fn builder<'a>(registry: &'a LayerRegistry, config: &EngineConfig, args: &BuildArgs) -> SchemaBuilder<'a> {
    let builder = SchemaBuilder::from_config(registry, config);
    match args.country.as_deref() {
        Some(code) => builder.country_code(Some(code)),
        None => builder,
    }
}

fn custom_fields(config: &EngineConfig, args: &BuildArgs) -> anyhow::Result<Vec<books_schemas::RawCustomField>> {
    match &args.custom_fields {
        Some(path) => read_custom_fields(path).with_context(|| format!("reading {}", path.display())),
        None => Ok(config.load_custom_fields()?),
    }
}

fn print_schema(map: &Arc<SchemaMap>, name: &str) -> anyhow::Result<()> {
    let schema = map
        .get(name)
        .with_context(|| format!("schema '{}' not found for region {}", name, map.country_code()))?;

    println!("{} ({})", schema.label, schema.name);
    println!(
        "  naming: {:?}  tree: {}  child: {}  submittable: {}  core: {}",
        schema.naming,
        schema.is_tree,
        schema.is_child,
        schema.is_submittable,
        schema.is_core
    );
    println!();
    for field in schema.fields() {
        let origin = if field.meta {
            "meta"
        } else if field.is_custom {
            "custom"
        } else {
            ""
        };
        let flags = [(field.required, "required"), (field.read_only, "read-only")]
            .iter()
            .filter(|(set, _)| *set)
            .map(|(_, label)| *label)
            .collect::<Vec<_>>()
            .join(",");
        println!("  {:<24} {:<14} {:<7} {}", field.fieldname, field.fieldtype, origin, flags);
    }
    Ok(())
}

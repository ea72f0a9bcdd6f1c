//! Minimal CLI: derive → (tables | check)
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use colored::Colorize;

use crate::builder::Derivation;
use crate::config::Config;
use crate::schema::{RawSchemaType, Schema};

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// derive resolver type tables from a schema type graph and a generator config
#[derive(Parser, Debug)]
pub struct CommandLineInterface {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// derive and print ResolversTypes / ResolversParentTypes
    Tables(TablesOut),
    /// derive and report mapper diagnostics (unused mappers, external imports)
    Check(CheckOut),
}

#[derive(Args, Debug, Clone)]
struct InputSettings {
    /// schema type graph (JSON array of type descriptions)
    #[arg(long, short)]
    schema: PathBuf,

    /// generator configuration (JSON object; defaults apply if omitted)
    #[arg(long, short)]
    config: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct TablesOut {
    #[command(flatten)]
    input_settings: InputSettings,

    /// emit a machine-readable JSON dump instead of TypeScript source
    #[arg(long, default_value_t = false)]
    json: bool,

    /// output file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct CheckOut {
    #[command(flatten)]
    input_settings: InputSettings,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl InputSettings {
    fn load(&self) -> anyhow::Result<(Schema, Config)> {
        let schema_src = std::fs::read_to_string(&self.schema)
            .with_context(|| format!("failed to read schema file {}", self.schema.display()))?;
        let de = &mut serde_json::Deserializer::from_str(&schema_src);
        let raw_types: Vec<RawSchemaType> = serde_path_to_error::deserialize(de)
            .with_context(|| format!("failed to parse schema file {}", self.schema.display()))?;
        let schema = Schema::from_raw(raw_types).context("invalid schema type graph")?;

        let config = match &self.config {
            None => Config::default(),
            Some(path) => {
                let config_src = std::fs::read_to_string(path)
                    .with_context(|| format!("failed to read config file {}", path.display()))?;
                Config::from_json(&config_src)
                    .with_context(|| format!("failed to parse config file {}", path.display()))?
            }
        };
        Ok((schema, config))
    }
}

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }

    pub fn run(&self) -> anyhow::Result<()> {
        match &self.cmd {
            Command::Tables(target) => {
                let (schema, config) = target.input_settings.load()?;
                let derivation = Derivation::run(&schema, &config);

                if config.show_unused_mappers {
                    warn_unused(&derivation);
                }

                let output = if target.json {
                    render_json(&derivation)?
                } else {
                    render_typescript(&derivation)
                };
                write_output(target.out.as_deref(), &output)
            }
            Command::Check(target) => {
                let (schema, config) = target.input_settings.load()?;
                let derivation = Derivation::run(&schema, &config);

                let unused = derivation.usage.unused_mappers(&derivation.registry);
                if unused.is_empty() {
                    println!("all configured mappers are used");
                } else {
                    for name in &unused {
                        println!(
                            "{} mapper {name:?} is configured but never used",
                            "unused:".yellow()
                        );
                    }
                }

                let grouped = crate::usage::grouped_external_references(&derivation.registry);
                for (module, refs) in &grouped {
                    let idents = refs
                        .iter()
                        .map(|r| {
                            if r.is_default_import {
                                format!("{} (default)", r.ident)
                            } else {
                                r.ident.clone()
                            }
                        })
                        .collect::<Vec<_>>()
                        .join(", ");
                    println!("external: {module} -> {idents}");
                }
                Ok(())
            }
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn warn_unused(derivation: &Derivation) {
    for name in derivation.usage.unused_mappers(&derivation.registry) {
        eprintln!(
            "{} mapper {name:?} is configured but never used",
            "warning:".yellow()
        );
    }
}

fn render_typescript(derivation: &Derivation) -> String {
    let mut out = String::new();
    for (type_name, table) in [
        ("ResolversTypes", &derivation.resolvers_types),
        ("ResolversParentTypes", &derivation.resolvers_parent_types),
    ] {
        out.push_str(&format!("export type {type_name} = {{\n"));
        for (name, expr) in table {
            out.push_str(&format!("  {name}: {expr};\n"));
        }
        out.push_str("};\n\n");
    }
    out.trim_end().to_string() + "\n"
}

fn render_json(derivation: &Derivation) -> anyhow::Result<String> {
    let dump = serde_json::json!({
        "resolversTypes": derivation.resolvers_types,
        "resolversParentTypes": derivation.resolvers_parent_types,
        "usedMappers": derivation.usage.used_names().collect::<Vec<_>>(),
        "unusedMappers": derivation.usage.unused_mappers(&derivation.registry),
    });
    Ok(serde_json::to_string_pretty(&dump)?)
}

fn write_output(out: Option<&Path>, content: &str) -> anyhow::Result<()> {
    match out {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create {}", parent.display()))?;
            }
            std::fs::write(path, content)
                .with_context(|| format!("failed to write {}", path.display()))?;
        }
        None => println!("{content}"),
    }
    Ok(())
}

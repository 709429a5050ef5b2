//! CLI definition for the `tenantry` command-line interface.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Tenantry - entity-type schemas and workspace configuration
///
/// Inspect industry templates, print default workspace configurations and
/// run records through an entity type's validation, defaults and formulas.
#[derive(Parser, Debug)]
#[command(name = "tenantry")]
#[command(version)]
#[command(about = "Entity-type schema and workspace configuration engine")]
pub struct Cli {
    /// Enable debug output to stderr
    #[arg(short, long, global = true)]
    pub debug: bool,

    /// Settings file layered over ~/.tenantry and ./.tenantry
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Inspect workspace templates
    Templates {
        #[command(subcommand)]
        command: TemplateCommands,
    },
    /// Print the default configuration for a new workspace
    Defaults {
        /// Workspace id to stamp into the configuration
        workspace_id: String,
    },
    /// Validate a record against an entity type
    Validate {
        #[command(flatten)]
        schema: SchemaArgs,
        /// Record file (JSON or YAML)
        record: PathBuf,
    },
    /// Validate a record, apply defaults and compute formulas
    Prepare {
        #[command(flatten)]
        schema: SchemaArgs,
        /// Record file (JSON or YAML)
        record: PathBuf,
    },
    /// Evaluate a formula against a record
    Formula {
        #[command(flatten)]
        schema: SchemaArgs,
        /// Formula with {field} placeholders
        expression: String,
        /// Record file (JSON or YAML)
        record: PathBuf,
    },
}

#[derive(Subcommand, Debug)]
pub enum TemplateCommands {
    /// List available templates
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print one template as JSON
    Show {
        /// Template id, e.g. real-estate
        id: String,
    },
}

/// Where to find the entity type a record belongs to.
#[derive(Args, Debug, Clone)]
pub struct SchemaArgs {
    /// Workspace configuration or template file (JSON or YAML)
    #[arg(long, value_name = "FILE")]
    pub schema: PathBuf,

    /// Name of the entity type within the schema file
    #[arg(long, value_name = "NAME")]
    pub entity_type: String,
}

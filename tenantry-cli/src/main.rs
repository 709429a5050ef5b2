//! `tenantry` binary.
//!
//! Commands:
//! - `tenantry templates list [--json]`: List available templates
//! - `tenantry templates show <id>`: Print one template
//! - `tenantry defaults <workspace-id>`: Print a default workspace configuration
//! - `tenantry validate|prepare|formula --schema <file> --entity-type <name> ...`:
//!   Run a record through an entity type
//!
//! Exit codes:
//! - 0: Success
//! - 1: Error
//! - 2: Record failed validation

use clap::Parser;
use tenantry::{failure_message, load_settings, logging, run, severity_of, Cli, EXIT_ERROR};
use tenantry_config::LoggingSettings;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let settings = match load_settings(&cli) {
        Ok(settings) => settings,
        Err(e) => {
            logging::init(cli.debug, &LoggingSettings::default());
            eprintln!("{}", failure_message(&e));
            std::process::exit(EXIT_ERROR);
        }
    };
    logging::init(cli.debug, &settings.logging);

    let mut stdout = std::io::stdout().lock();
    let exit_code = match run(cli.command, &settings, &mut stdout).await {
        Ok(code) => code,
        Err(e) => {
            tracing::debug!(error = ?e, severity = %severity_of(&e), "command failed");
            eprintln!("{}", failure_message(&e));
            EXIT_ERROR
        }
    };
    std::process::exit(exit_code);
}

#[cfg(test)]
mod tests {
    use super::*;
    use tenantry::{Commands, TemplateCommands};

    #[test]
    fn test_cli_parsing_templates_list() {
        let cli = Cli::parse_from(["tenantry", "templates", "list", "--json"]);
        assert!(!cli.debug);
        assert!(matches!(
            cli.command,
            Commands::Templates {
                command: TemplateCommands::List { json: true }
            }
        ));
    }

    #[test]
    fn test_cli_parsing_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["tenantry", "defaults", "ws-1", "--debug", "--config", "x.toml"]);
        assert!(cli.debug);
        assert_eq!(cli.config.as_deref(), Some(std::path::Path::new("x.toml")));
        assert!(matches!(cli.command, Commands::Defaults { ref workspace_id } if workspace_id == "ws-1"));
    }

    #[test]
    fn test_cli_parsing_formula() {
        let cli = Cli::parse_from([
            "tenantry",
            "formula",
            "--schema",
            "crm.yaml",
            "--entity-type",
            "deal",
            "{amount} * 2",
            "deal.json",
        ]);
        match cli.command {
            Commands::Formula {
                schema,
                expression,
                record,
            } => {
                assert_eq!(schema.entity_type, "deal");
                assert_eq!(expression, "{amount} * 2");
                assert_eq!(record, std::path::PathBuf::from("deal.json"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_cli_requires_subcommand() {
        assert!(Cli::try_parse_from(["tenantry"]).is_err());
    }
}

//! # sieve CLI Entry Point
//!
//! Assembles subcommands and dispatches to handler modules.

use std::process::ExitCode;

use clap::Parser;

/// sieve — compiled OpenAPI validation pipelines.
///
/// Compiles the schemas of an OpenAPI document into validation processors
/// and runs them against sample values.
#[derive(Parser, Debug)]
#[command(name = "sieve", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Compile every operation and print the definition manifest.
    Compile(sieve_cli::compile::CompileArgs),
    /// Check a request or response value against one operation.
    Check(sieve_cli::check::CheckArgs),
}

fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Compile(args) => {
            let manifest = sieve_cli::compile::run_compile(&args)?;
            println!("{}", serde_json::to_string_pretty(&manifest)?);
            Ok(ExitCode::SUCCESS)
        }
        Commands::Check(args) => {
            let report = sieve_cli::check::run_check(&args)?;
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(if report.valid { ExitCode::SUCCESS } else { ExitCode::FAILURE })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_package_metadata_names_this_project() {
        assert_eq!(env!("CARGO_PKG_NAME"), "sieve-cli");
        assert!(env!("CARGO_PKG_REPOSITORY").is_empty());
    }

    #[test]
    fn test_check_requires_a_direction() {
        let parsed = Cli::try_parse_from(["sieve", "check", "--spec", "a.yaml", "--operation", "op", "--value", "v.json"]);
        assert!(parsed.is_err());
        let parsed = Cli::try_parse_from([
            "sieve", "check", "--spec", "a.yaml", "--operation", "op", "--value", "v.json", "--request", "--status", "200",
        ]);
        assert!(parsed.is_err());
    }
}

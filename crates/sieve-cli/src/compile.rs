//! # Compile Subcommand
//!
//! Compiles every operation of a document and reports the outline of each
//! generated definition.

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use serde::Serialize;
use serde_json::Value;
use sieve_schema::DefinitionGenerator;

/// Arguments for the compile subcommand.
#[derive(Args, Debug)]
pub struct CompileArgs {
    /// OpenAPI document (`.json`, `.yaml` or `.yml`).
    #[arg(long)]
    pub spec: PathBuf,

    /// Namespace prefix of the generated definitions.
    #[arg(long, default_value = "Api")]
    pub namespace: String,

    /// Do not generate request definitions.
    #[arg(long)]
    pub skip_requests: bool,

    /// Do not generate response definitions.
    #[arg(long)]
    pub skip_responses: bool,
}

/// One line of the manifest.
#[derive(Debug, Clone, Serialize)]
pub struct ManifestEntry {
    pub namespace: String,
    pub name: String,
    pub outline: Value,
}

/// Compile the document named by `args`.
pub fn run_compile(args: &CompileArgs) -> anyhow::Result<Vec<ManifestEntry>> {
    let document = crate::load_document(&args.spec)?;
    let definitions = DefinitionGenerator::new()
        .generate(&document, &args.namespace, !args.skip_requests, !args.skip_responses)
        .with_context(|| format!("failed to compile {}", args.spec.display()))?;

    tracing::info!(count = definitions.len(), "compiled definitions");
    Ok(definitions
        .into_iter()
        .map(|definition| ManifestEntry {
            outline: definition.processor.outline(),
            namespace: definition.namespace,
            name: definition.name,
        })
        .collect())
}

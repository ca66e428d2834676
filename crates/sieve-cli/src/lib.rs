//! # sieve-cli — Command-Line Interface
//!
//! ## Subcommands
//!
//! - `compile` — compile a document and print `[{namespace, name, outline}]`
//! - `check` — run one operation's request or response processor on a value
//!
//! Documents and values load from `.json`, `.yaml` or `.yml` files.
//! Logging goes to stderr and is controlled by `RUST_LOG`.
//!
//! ## Crate Policy
//!
//! - CLI construction (argument parsing) is separated from business logic.
//! - Handler functions delegate to `sieve-schema` and `sieve-core`.
//! - Handlers return data; only `main` prints.

pub mod check;
pub mod compile;

use std::path::Path;

use anyhow::Context;
use serde_json::Value;
use sieve_schema::Document;

/// Load an OpenAPI document.
pub fn load_document(path: &Path) -> anyhow::Result<Document> {
    Document::from_path(path).with_context(|| format!("failed to load OpenAPI document {}", path.display()))
}

/// Load a JSON or YAML value, by extension.
pub fn load_value(path: &Path) -> anyhow::Result<Value> {
    let text = std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    let yaml = matches!(path.extension().and_then(|e| e.to_str()), Some("yaml" | "yml"));
    let value = if yaml {
        serde_yaml::from_str(&text).with_context(|| format!("invalid YAML in {}", path.display()))?
    } else {
        serde_json::from_str(&text).with_context(|| format!("invalid JSON in {}", path.display()))?
    };
    Ok(value)
}

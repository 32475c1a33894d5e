//! # Warden - Permission-aware entity management
//!
//! Entry point that wires configuration, roles and managers together and
//! runs the demo scenario.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  main.rs (this file) - Dependency Injection & Wiring           │
//! │    │                                                            │
//! │    ├── Loads: WardenConfig (shared) → RoleManager (rbac)       │
//! │    ├── Creates: InMemoryRepository per entity type (adapter)   │
//! │    ├── Creates: EntityManager per agent (usecase)              │
//! │    └── Runs: the user/article scenario (scenario.rs)           │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Usage:
//!   warden                          - Run with the built-in roles
//!   warden --config warden.yaml     - Run with roles from a file
//!   warden --role admin             - Choose the author's role
//!   warden --json                   - Print the report as JSON

mod catalog;
mod scenario;

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use shared::WardenConfig;
use tracing::info;

use crate::scenario::Report;

#[derive(Parser)]
#[command(name = "warden")]
#[command(about = "Warden - authorize, validate, fill and persist entities")]
#[command(version)]
struct Cli {
    /// Configuration file (JSON or YAML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Role of the article author
    #[arg(short, long, default_value = "member")]
    role: String,

    /// Output as JSON
    #[arg(long)]
    json: bool,
}

fn load_config(path: Option<&Path>) -> anyhow::Result<WardenConfig> {
    match path {
        Some(path) => WardenConfig::from_file(path)
            .with_context(|| format!("failed to load {}", path.display())),
        None => Ok(catalog::default_config()),
    }
}

fn print_report(report: &Report) {
    for step in &report.steps {
        let mark = if step.success { "✓" } else { "✗" };
        println!("{} {} ({})", mark, step.action, step.agent);
        if !step.codes.is_empty() {
            println!("    errors: {}", step.codes.join(", "));
        }
        if let Some(resource) = &step.resource {
            println!("    {}", serde_json::Value::Object(resource.clone()));
        }
    }

    let summary = &report.summary;
    println!();
    println!(
        "audit: {} entries ({} granted, {} denied, {} rejected)",
        summary.total, summary.granted, summary.denied, summary.rejected
    );
}

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref())?;
    info!(roles = config.roles.len(), author_role = %cli.role, "starting scenario");

    let report = scenario::run(&config, &cli.role)?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }
    Ok(())
}

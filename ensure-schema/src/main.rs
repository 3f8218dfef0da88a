//! ensure-schema: apply the serial item transfer schema patch, or check
//! that the database answers at all.

use std::io::Write;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use ensure_core::{Reconciler, ReconcilerConfig};
use ensure_schema::catalog::bpl_barcode_catalog;
use ensure_schema::probe::smoke_test;
use ensure_schema::{DatabaseArgs, Dialect, SchemaConnector};

#[derive(Parser)]
#[command(name = "ensure-schema", version)]
#[command(about = "Idempotent schema patch and connectivity check")]
struct Cli {
    #[command(flatten)]
    db: DatabaseArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add the BPL and barcode columns and the item lookup index
    Apply {
        /// Skip the confirmation prompt
        #[arg(long)]
        auto: bool,

        /// Per-call timeout in seconds
        #[arg(long, default_value = "30")]
        call_timeout_secs: u64,

        /// Print the final report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Connect and run a probe query
    Check {
        /// Query to run
        #[arg(long, default_value = "SELECT 1")]
        query: String,

        /// Maximum rows to show
        #[arg(long, default_value = "5")]
        limit: usize,
    },
    /// Print the DDL each catalog entry would run
    Plan {
        /// Dialect to render for
        #[arg(long, value_parser = ["mysql", "sqlite"], default_value = "mysql")]
        dialect: String,
    },
}

fn confirm(prompt: &str) -> Result<bool> {
    print!("{} (y/N): ", prompt);
    std::io::stdout().flush()?;
    let mut answer = String::new();
    std::io::stdin().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("ensure_schema=info".parse()?)
                .add_directive("ensure_core=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Apply {
            auto,
            call_timeout_secs,
            json,
        } => {
            if !auto && !confirm("Do you want to run this migration?")? {
                info!("Migration cancelled");
                return Ok(());
            }

            let settings = cli.db.settings().context("Invalid database configuration")?;
            let connector = SchemaConnector::new(settings).context("Failed to create schema connector")?;
            let catalog = bpl_barcode_catalog();

            let reconciler = Reconciler::new(ReconcilerConfig {
                call_timeout: Duration::from_secs(call_timeout_secs),
                ..Default::default()
            });
            let report = reconciler.reconcile(&catalog, &connector).await;

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            }
            if report.overall_success {
                info!("Schema patch applied");
            } else {
                warn!(state = ?report.state, "Schema patch did not complete");
            }
            std::process::exit(report.exit_code());
        }
        Commands::Check { query, limit } => {
            let settings = cli.db.settings().context("Invalid database configuration")?;
            let connector = SchemaConnector::new(settings).context("Failed to create schema connector")?;
            match smoke_test(&connector, &query, limit).await {
                Ok(report) => {
                    for row in &report.rows {
                        println!("{}", row);
                    }
                    Ok(())
                }
                Err(e) => {
                    eprintln!("Database check failed: {}", e);
                    std::process::exit(1);
                }
            }
        }
        Commands::Plan { dialect } => {
            let dialect = if dialect == "sqlite" {
                Dialect::Sqlite
            } else {
                Dialect::MySql
            };
            for def in &bpl_barcode_catalog() {
                let sql = dialect.create_statement(&def.id, &def.payload)?;
                println!("-- {}\n{};", def.label, sql);
            }
            Ok(())
        }
    }
}

//! ensure-sap: create the stored queries the warehouse application needs.

use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::sync::watch;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use ensure_core::{Reconciler, ReconcilerConfig};
use ensure_sap::{RemoteQueryConnector, SapArgs, initialize_queries, required_queries};

#[derive(Parser)]
#[command(name = "ensure-sap", version)]
#[command(about = "Idempotent stored query setup for SAP Business One")]
struct Cli {
    #[command(flatten)]
    sap: SapArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check every stored query and create the missing ones
    Apply {
        /// Per-call timeout in seconds
        #[arg(long, default_value = "30")]
        call_timeout_secs: u64,

        /// Skip the re-check after the main pass
        #[arg(long)]
        no_verify: bool,

        /// Print the final report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Run as a startup hook: skip quietly when unconfigured, always exit 0
    Bootstrap,
    /// List the stored queries in the catalog
    List,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("ensure_sap=info".parse()?)
                .add_directive("ensure_core=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Apply {
            call_timeout_secs,
            no_verify,
            json,
        } => {
            let settings = cli.sap.settings().context("Invalid SAP configuration")?;
            let connector = RemoteQueryConnector::new(settings).context("Failed to create query connector")?;

            let (cancel_tx, cancel_rx) = watch::channel(false);
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    warn!("Interrupted, stopping after the current query");
                    let _ = cancel_tx.send(true);
                }
            });

            let reconciler = Reconciler::new(ReconcilerConfig {
                call_timeout: Duration::from_secs(call_timeout_secs),
                verify: !no_verify,
            })
            .with_cancellation(cancel_rx);
            let report = reconciler.reconcile(&required_queries(), &connector).await;

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            }
            std::process::exit(report.exit_code());
        }
        Commands::Bootstrap => {
            let settings = cli.sap.settings().unwrap_or_else(|e| {
                warn!(error = %e, "Ignoring unreadable SAP credentials");
                SapArgs {
                    credentials: None,
                    ..cli.sap.clone()
                }
                .settings()
                .unwrap_or_else(|_| ensure_sap::SapSettings::new("", "", "", ""))
            });
            if initialize_queries(settings, ReconcilerConfig::default()).await.is_none() {
                info!("Stored query initialization skipped");
            }
            Ok(())
        }
        Commands::List => {
            for def in &required_queries() {
                let params = def.payload.param_list.as_deref().unwrap_or("-");
                println!("{:<32} {:<36} {}", def.id, def.label, params);
            }
            Ok(())
        }
    }
}

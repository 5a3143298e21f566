//! mockexec CLI: run dispatch simulations and render doc-build arguments.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use mockexec::config::Config;
use mockexec::doc_build::DocBuildParams;
use mockexec::driver::{DriverConfig, HeartbeatDriver};
use mockexec::executor::loader;
use mockexec::scenario::Scenario;
use mockexec::store::memory::InMemoryStore;
use mockexec::telemetry::{TelemetryConfig, init_telemetry};

#[derive(Parser)]
#[command(name = "mockexec", about = "Deterministic task-dispatch simulator")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run a scenario file and print the ledger and history as JSON
    Simulate {
        /// Scenario TOML file
        scenario: PathBuf,
        /// Delay between heartbeats in milliseconds
        #[arg(long, default_value_t = 0)]
        interval_ms: u64,
        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,
    },
    /// Print the doc-builder argument list for the given options
    DocArgs {
        #[command(flatten)]
        params: DocBuildParams,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    match cli.command {
        Command::Simulate {
            scenario,
            interval_ms,
            pretty,
        } => cmd_simulate(scenario, interval_ms, pretty).await,
        Command::DocArgs { params } => {
            println!("{}", params.args_doc_builder().join(" "));
            Ok(())
        }
    }
}

async fn cmd_simulate(path: PathBuf, interval_ms: u64, pretty: bool) -> anyhow::Result<()> {
    let config = Config::from_env()?;

    let _guard = init_telemetry(TelemetryConfig {
        endpoint: config.otel_endpoint.clone(),
        service_name: "mockexec".to_string(),
        log_level: config.log_level.clone(),
    })?;

    let scenario = Scenario::load(&path)?;

    let store = Arc::new(InMemoryStore::new());
    scenario.seed_store(&store)?;

    let mut executor_config = config.executor_config();
    if let Some(parallelism) = scenario.parallelism {
        executor_config.parallelism = parallelism;
    }
    let name = scenario.executor.as_deref().or(config.executor.as_deref());
    let mut executor = loader::load_mock(name, executor_config, store.clone())?;
    scenario.apply(&mut executor)?;

    let mut driver = HeartbeatDriver::new(
        executor,
        DriverConfig {
            interval: Duration::from_millis(interval_ms),
            max_cycles: scenario.heartbeats,
            stop_when_idle: scenario.heartbeats.is_none(),
        },
    );

    let shutdown = driver.shutdown_handle();
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        shutdown.notify_one();
    });

    let summary = driver.run().await?;
    let executor = driver.into_executor();

    let report = serde_json::json!({
        "cycles": summary.cycles,
        "stopped": summary.reason,
        "ledger": executor.ledger(),
        "history": executor.history(),
        "pending": executor.base().queued_count(),
    });
    let rendered = if pretty {
        serde_json::to_string_pretty(&report)?
    } else {
        serde_json::to_string(&report)?
    };
    println!("{rendered}");
    Ok(())
}

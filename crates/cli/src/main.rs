mod report;

use std::{
    fs::{self, OpenOptions},
    str::FromStr,
    sync::{Arc, Mutex},
};

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use falcone_core::{
    config::{self, AppConfig},
    game::REQUIRED_SELECTIONS,
    FalconeClient, GameStore, SearchWorkflow,
};
use tracing::info;
use tracing_subscriber::{prelude::*, EnvFilter};

/// Send four vehicles to four planets and ask where Queen Al Falcone is hiding.
#[derive(Debug, Parser)]
#[command(name = "falcone", version)]
struct Cli {
    /// Override the search service base URL.
    #[arg(long, global = true, value_name = "URL")]
    api_url: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List destinations and vehicles offered by the service.
    Catalog,
    /// Apply four picks in order and run the search.
    Find {
        /// A `DESTINATION=VEHICLE` pair; repeat four times.
        #[arg(long = "pick", value_name = "DESTINATION=VEHICLE", required = true)]
        picks: Vec<Pick>,
        /// Print the result as JSON.
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Clone)]
struct Pick {
    destination: String,
    vehicle: String,
}

impl FromStr for Pick {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let (destination, vehicle) = raw
            .split_once('=')
            .ok_or_else(|| format!("expected DESTINATION=VEHICLE, got '{raw}'"))?;
        let destination = destination.trim();
        let vehicle = vehicle.trim();
        if destination.is_empty() || vehicle.is_empty() {
            return Err(format!("expected DESTINATION=VEHICLE, got '{raw}'"));
        }
        Ok(Self {
            destination: destination.to_string(),
            vehicle: vehicle.to_string(),
        })
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    if let Command::Find { picks, .. } = &cli.command {
        check_pick_count(picks)?;
    }
    init_logging()?;

    config::ensure_default_config()?;
    let mut config = AppConfig::load()?;
    if let Some(url) = cli.api_url {
        config = config.with_api_base_url(url);
    }

    let client = Arc::new(FalconeClient::new(&config)?);
    info!(base_url = %client.base_url(), "Loading catalog");
    let store = GameStore::new(SearchWorkflow::new(client.clone(), client.clone()));
    store.load(client.as_ref(), client.as_ref()).await?;

    match cli.command {
        Command::Catalog => {
            print!("{}", report::catalog(&store.snapshot().catalog));
            Ok(())
        }
        Command::Find { picks, json } => find(&store, &picks, json).await,
    }
}

fn check_pick_count(picks: &[Pick]) -> Result<()> {
    if picks.len() != REQUIRED_SELECTIONS {
        bail!(
            "expected exactly {REQUIRED_SELECTIONS} --pick arguments, got {}",
            picks.len()
        );
    }
    Ok(())
}

async fn find(store: &GameStore, picks: &[Pick], json: bool) -> Result<()> {
    for pick in picks {
        let catalog = store.snapshot().catalog;
        let destination = catalog
            .destination(&pick.destination)
            .ok_or_else(|| anyhow!("unknown destination '{}'", pick.destination))?;
        let vehicle = catalog
            .vehicle(&pick.vehicle)
            .ok_or_else(|| anyhow!("unknown vehicle '{}'", pick.vehicle))?;
        store.apply_selection(destination, vehicle)?;
    }

    let result = store.search().await?;
    let snapshot = store.snapshot();
    info!(
        status = %result.status,
        found = result.is_success(),
        time = snapshot.state.total_time(),
        "Search finished"
    );

    if json {
        let output = serde_json::json!({
            "result": &result,
            "total_time": snapshot.state.total_time(),
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&output).context("failed to serialize result")?
        );
    } else {
        print!("{}", report::outcome(&result, &snapshot.state));
    }

    if let Some(message) = result.error_message {
        bail!("search failed: {message}");
    }
    Ok(())
}

fn init_logging() -> Result<()> {
    let log_dir = std::env::current_dir()?.join("logs");
    fs::create_dir_all(&log_dir)?;
    let log_path = log_dir.join("falcone.log");
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("failed to open log file {}", log_path.display()))?;

    let env_filter = EnvFilter::from_default_env();

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .compact()
        .with_writer(std::io::stderr);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .compact()
        .with_ansi(false)
        .with_writer(Mutex::new(log_file));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .with(file_layer)
        .init();

    Ok(())
}

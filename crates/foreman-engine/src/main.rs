//! Foreman engine binary.
//!
//! Runs a fleet of LLM-directed agents against an in-process simulated
//! world and takes commands from the console. With no `LLM_BACKEND` set
//! the keyword planner stands in for the model, so the whole pipeline
//! runs offline.
//!
//! # Startup Sequence
//!
//! 1. Load `foreman-config.yaml` (path from `FOREMAN_CONFIG`)
//! 2. Initialize structured logging (tracing)
//! 3. Read LLM settings from the environment and load prompt templates
//! 4. Create the simulated world (`FOREMAN_FAILURE_RATE`) and wire the engine
//! 5. The player joins: the fleet spawns in formation
//! 6. Read console commands until `/quit`, end of input, or Ctrl-C
//! 7. The player leaves: the fleet is torn down

mod console;
mod engine;
mod error;
mod offline;
mod sim;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use foreman_core::{FleetConfig, LogFormat, LoggingConfig};
use foreman_planner::{PlannerConfig, PromptComposer, create_backend};
use foreman_types::BlockPos;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::engine::{Engine, Flow};
use crate::offline::{EngineBackend, OfflinePlanner};
use crate::sim::{DEFAULT_FAILURE_RATE, SimulatedWorld};

/// Config file used when `FOREMAN_CONFIG` is unset.
const DEFAULT_CONFIG_PATH: &str = "foreman-config.yaml";

/// Name of the simulated player.
const PLAYER: &str = "Player";

/// Where the simulated player stands.
const PLAYER_SPAWN: BlockPos = BlockPos::new(0, 64, 0);

/// Application entry point.
///
/// # Errors
///
/// Returns an error if configuration, templates, or console input fail.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Load configuration.
    let config_path = std::env::var_os("FOREMAN_CONFIG")
        .map_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from);
    let config = FleetConfig::load_or_default(&config_path)
        .with_context(|| format!("loading {}", config_path.display()))?;

    // 2. Initialize structured logging.
    init_logging(&config.logging);
    info!(
        config = %config_path.display(),
        found = config_path.exists(),
        agents = config.fleet.names.len(),
        "foreman-engine starting"
    );

    // 3. Planner.
    let planner = PlannerConfig::from_env().context("reading LLM settings")?;
    let composer = PromptComposer::from_config(planner.templates_dir.as_deref())
        .context("loading prompt templates")?;
    let backend = match &planner.backend {
        Some(llm) => {
            info!(
                backend = ?llm.backend_type,
                model = %llm.model,
                api_url = %llm.api_url,
                timeout = ?planner.llm_timeout,
                "using LLM backend"
            );
            EngineBackend::Remote(create_backend(llm))
        }
        None => {
            info!("LLM_BACKEND not set, using the offline keyword planner");
            EngineBackend::Offline(OfflinePlanner::new())
        }
    };

    // 4. World and engine.
    let failure_rate = std::env::var("FOREMAN_FAILURE_RATE")
        .ok()
        .and_then(|rate| rate.parse().ok())
        .unwrap_or(DEFAULT_FAILURE_RATE);
    let world = Arc::new(SimulatedWorld::new(PLAYER, PLAYER_SPAWN).with_failure_rate(failure_rate));
    let mut engine = Engine::new(&config, world, backend, composer, planner.llm_timeout);

    // 5. Player joins.
    match engine.join() {
        Ok(spawned) => info!(spawned = spawned.unwrap_or(0), "player joined"),
        Err(e) => warn!(error = %e, "fleet failed to spawn, retry with /join"),
    }

    // 6. Console loop.
    let result = run_console(&mut engine).await;

    // 7. Player leaves.
    let removed = engine.leave();
    info!(removed, "foreman-engine stopped");
    result
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` overrides the configured level. Logs go to stderr so they
/// do not interleave with console replies.
fn init_logging(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);
    match logging.format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.init(),
    }
}

/// Read and execute console lines until the operator is done.
async fn run_console(engine: &mut Engine) -> anyhow::Result<()> {
    println!("{}", console::HELP);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let line = tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("interrupt received");
                return Ok(());
            }
            line = lines.next_line() => line.context("reading console input")?,
        };
        let Some(line) = line else {
            info!("console input closed");
            return Ok(());
        };

        let input = match console::parse_line(&line) {
            Ok(input) => input,
            Err(e) => {
                println!("{e}");
                continue;
            }
        };
        match engine.handle(input).await {
            Ok(Flow::Reply(text)) if text.is_empty() => {}
            Ok(Flow::Reply(text)) => println!("{text}"),
            Ok(Flow::Quit) => return Ok(()),
            Err(e) => println!("{e}"),
        }
    }
}

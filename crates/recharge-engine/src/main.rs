//! Engine binary for the Recharge simulation.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `recharge-config.yaml` (defaults if absent)
//! 2. Initialize structured logging (tracing) at the configured level
//! 3. Spawn regions, stations, and drones from the configured seed
//! 4. Create operator state from simulation bounds and wire Ctrl-C to stop
//! 5. Run the simulation loop
//! 6. Log the result

mod error;
mod spawner;

use std::path::Path;
use std::sync::Arc;

use recharge_core::config::SimulationConfig;
use recharge_core::operator::OperatorState;
use recharge_core::runner;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;

/// Configuration file looked up in the working directory.
const CONFIG_FILE: &str = "recharge-config.yaml";

/// Application entry point for the engine.
///
/// # Errors
///
/// Returns an error if any initialization step or the simulation itself fails.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration.
    let config = load_config()?;

    // 2. Initialize structured logging.
    let filter = EnvFilter::try_new(&config.logging.level).map_err(|e| EngineError::LogFilter {
        directive: config.logging.level.clone(),
        message: e.to_string(),
    })?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    info!(
        world_name = config.world.name,
        seed = config.world.seed,
        tick_interval_ms = config.world.tick_interval_ms,
        log_level = config.logging.level,
        "recharge-engine starting"
    );

    // 3. Spawn the world.
    let mut state = spawner::spawn_world(&config)?;

    // 4. Operator state and Ctrl-C.
    let operator = Arc::new(OperatorState::new(
        config.world.tick_interval_ms,
        &config.simulation,
    ));
    {
        let operator = Arc::clone(&operator);
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    info!("Ctrl-C received, stopping after the current tick");
                    operator.request_stop();
                }
                Err(e) => warn!(error = %e, "Failed to listen for Ctrl-C"),
            }
        });
    }

    // 5. Run the simulation.
    let result = runner::run_simulation(&mut state, &operator)
        .await
        .map_err(EngineError::from)?;

    // 6. Log results.
    runner::log_simulation_end(&result);
    info!(
        end_reason = ?result.end_reason,
        total_ticks = result.total_ticks,
        "recharge-engine shutdown complete"
    );

    Ok(())
}

/// Load the simulation configuration from [`CONFIG_FILE`].
///
/// Falls back to defaults, still honouring `RECHARGE_LOG`, when the file is
/// absent.
fn load_config() -> Result<SimulationConfig, EngineError> {
    let config_path = Path::new(CONFIG_FILE);
    if config_path.exists() {
        Ok(SimulationConfig::from_file(config_path)?)
    } else {
        Ok(SimulationConfig::parse("")?)
    }
}

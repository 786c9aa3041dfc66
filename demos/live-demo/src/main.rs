mod commands;
mod session_state;

use std::error::Error;
use std::fs;
use std::io;
use std::sync::Arc;

use commands::{parse_scenario, run_scenario, DEFAULT_SCENARIO};
use session_state::JsonLinesDelegate;

/// Usage: `live-demo [scenario.json]`
///
/// Events are printed to stdout as JSON lines; logs go to stderr.
fn main() -> Result<(), Box<dyn Error>> {
    let json = match std::env::args().nth(1) {
        Some(path) => fs::read_to_string(&path)
            .map_err(|e| format!("failed to read scenario {}: {}", path, e))?,
        None => DEFAULT_SCENARIO.to_string(),
    };
    let scenario = parse_scenario(&json)?;

    let default_level = scenario.log_level.as_deref().unwrap_or("info");
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .target(env_logger::Target::Stderr)
        .init();

    let sink = Arc::new(JsonLinesDelegate::new(io::stdout()));
    let rejected = run_scenario(&scenario, sink)?;
    log::info!("Scenario finished: {} steps, {} rejected", scenario.steps.len(), rejected);
    Ok(())
}

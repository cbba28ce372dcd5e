//! Strata Application
//!
//! Headless shell around the engine: loads a drawing script, replays it
//! through a session and exports the composite as PNG.

mod error;
mod export;
mod script;

pub use error::{AppError, AppResult};
pub use export::{encode_png, export_png};
pub use script::{Player, Script, Step, load_bitmap};

use std::path::Path;
use strata_core::{EngineConfig, Session};

/// Options for a single replay.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Overrides the script's own configuration.
    pub config: Option<EngineConfig>,
}

/// Load `script_path`, replay it and return the resulting session.
pub fn replay(script_path: &Path, options: &RunOptions) -> AppResult<Session> {
    let script = Script::load(script_path)?;
    let config = options
        .config
        .clone()
        .or(script.config)
        .unwrap_or_default();
    let base_dir = script_path.parent().unwrap_or_else(|| Path::new("."));

    let mut player = Player::new(Session::new(config)?, base_dir);
    player.run(&script.steps)?;
    log::info!(
        "Replayed {} steps ({} segments drawn)",
        script.steps.len(),
        player.segments().len()
    );
    Ok(player.into_session())
}

/// Replay a script and write the final composite to `output`.
pub fn run(script_path: &Path, output: &Path, options: &RunOptions) -> AppResult<()> {
    let session = replay(script_path, options)?;
    export_png(&session, output)?;
    Ok(())
}

/// Read an engine configuration file.
pub fn load_config(path: &Path) -> AppResult<EngineConfig> {
    Ok(EngineConfig::from_json(&std::fs::read_to_string(path)?)?)
}

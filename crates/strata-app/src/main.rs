//! Main application entry point (native).

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use strata_app::{RunOptions, load_config, run};

#[derive(Parser, Debug)]
#[command(name = "strata", version, about = "Replay a Strata drawing script and export it as PNG")]
struct Cli {
    /// Script to replay.
    #[arg(value_name = "SCRIPT")]
    script: PathBuf,
    /// Where to write the exported image.
    #[arg(short, long, value_name = "FILE", default_value = "out.png")]
    output: PathBuf,
    /// Engine configuration, overriding the script's own.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();
    log::info!("Starting Strata");

    let result = cli
        .config
        .as_deref()
        .map(load_config)
        .transpose()
        .and_then(|config| run(&cli.script, &cli.output, &RunOptions { config }));

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            eprintln!("strata: {e}");
            ExitCode::FAILURE
        }
    }
}

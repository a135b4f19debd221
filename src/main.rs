mod accusation;
mod clues;
mod error;
mod game;
mod scenario;
mod suspects;

use std::path::Path;

use anyhow::{Context, Result};
use log::info;
use scenario::Scenario;

fn main() -> Result<()> {
    // Diagnostics go to stderr. Control verbosity with RUST_LOG:
    //   RUST_LOG=info   detective-quest   # clues collected + verdicts
    //   RUST_LOG=debug  detective-quest   # + every room entered and transition
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .format_timestamp_millis()
        .init();

    let args: Vec<String> = std::env::args().collect();

    let scenario = match args.get(1) {
        Some(path) => Scenario::load(Path::new(path))
            .with_context(|| format!("failed to load scenario {path}"))?,
        None => {
            info!("No scenario file given, using the built-in mansion");
            Scenario::mansion()
        }
    };

    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    game::run(&scenario, &mut stdin.lock(), &mut stdout.lock())
}

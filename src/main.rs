use std::io::{Read, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use lightbox::replay::{run_scenario, Scenario};

/// Replays a JSON scenario (from the file given as the first argument, or
/// stdin) and prints the projection after every step as JSON.
fn main() -> Result<()> {
    lightbox::logging::init();

    let input = match std::env::args_os().nth(1).map(PathBuf::from) {
        Some(path) => std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read scenario {}", path.display()))?,
        None => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("failed to read scenario from stdin")?;
            buffer
        }
    };
    let scenario: Scenario = serde_json::from_str(&input).context("invalid scenario JSON")?;
    let config = scenario
        .config
        .clone()
        .unwrap_or_else(lightbox::load_config);

    tracing::info!(
        items = scenario.items.len(),
        steps = scenario.steps.len(),
        "replaying scenario"
    );
    let records = run_scenario(&scenario, config).context("failed to mount lightbox")?;

    let mut stdout = std::io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, &records).context("failed to write projections")?;
    writeln!(stdout)?;
    Ok(())
}

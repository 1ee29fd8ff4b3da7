use anyhow::{bail, Result};
use colored::Colorize;
use sequencer_core::config::DEFAULT_CONFIG_PATH;
use sequencer_core::{ConfigManager, SequencerConfig};
use std::path::{Path, PathBuf};
use tracing::info;

pub fn execute(config_path: Option<&Path>, force: bool) -> Result<()> {
    let path = config_path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));

    if path.exists() && !force {
        bail!(
            "Config file already exists at {} (use --force to overwrite)",
            path.display()
        );
    }

    let manager = ConfigManager::with_config(SequencerConfig::default(), &path);
    manager.save()?;
    info!("Wrote default configuration");

    println!(
        "{} {}",
        "Configuration written to".green().bold(),
        path.display().to_string().cyan()
    );
    Ok(())
}

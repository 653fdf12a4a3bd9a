//! Initialize .faultline.toml configuration

use anyhow::Result;
use faultline_core::config::CONFIG_FILE;
use faultline_core::FaultlineConfig;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Write a default config into `path`; returns where it was written, or
/// `None` when a config already exists there.
pub fn write_default_config(path: &Path) -> Result<Option<PathBuf>> {
    let config_path = path.join(CONFIG_FILE);
    if config_path.exists() {
        debug!("{} already present, leaving it untouched", config_path.display());
        return Ok(None);
    }

    FaultlineConfig::default().save(&config_path)?;
    Ok(Some(config_path))
}

pub fn run(path: Option<&Path>) -> Result<()> {
    let target_path = path.unwrap_or_else(|| Path::new("."));

    match write_default_config(target_path)? {
        Some(config_path) => {
            println!("Created {} at {}", CONFIG_FILE, config_path.display());
            println!("\nYou can now customize the configuration and run:");
            println!("  faultline analyze");
        }
        None => {
            println!(
                "{} already exists at {}",
                CONFIG_FILE,
                target_path.join(CONFIG_FILE).display()
            );
        }
    }

    Ok(())
}

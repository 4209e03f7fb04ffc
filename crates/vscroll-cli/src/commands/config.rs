use std::path::Path;

use anyhow::{bail, Result};

use vscroll_core::AppConfig;

pub fn run(config: &AppConfig, path: &Path, write: bool, force: bool) -> Result<()> {
    if !write {
        println!("# {}", path.display());
        print!("{}", config.to_toml()?);
        return Ok(());
    }

    if path.exists() && !force {
        bail!(
            "Config file already exists at {}\nUse --force to overwrite it.",
            path.display()
        );
    }

    AppConfig::default().save_to(path)?;
    println!("Wrote default configuration to {}", path.display());
    Ok(())
}

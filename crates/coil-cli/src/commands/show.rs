//! Print the effective configuration.

use anyhow::Result;
use colored::Colorize;
use std::path::PathBuf;

use crate::config::Config;

pub fn run(path: Option<PathBuf>) -> Result<()> {
    let (config, source) = Config::load(path.as_deref())?;
    config.validate()?;

    match source {
        Some(path) => eprintln!("{} {}", "# from".dimmed(), path.display()),
        None => eprintln!("{}", "# defaults (no coil.toml found)".dimmed()),
    }
    print!("{}", config.to_toml()?);
    Ok(())
}

//! Initialize a new Coil project.

use anyhow::{Context, Result};
use colored::Colorize;
use std::path::PathBuf;

use crate::config::{Config, CONFIG_FILE};

pub fn run(path: Option<PathBuf>) -> Result<()> {
    let base_path = match path {
        Some(path) => path,
        None => std::env::current_dir().context("Failed to resolve current directory")?,
    };

    println!("{} Initializing Coil project...", "→".blue());

    std::fs::create_dir_all(&base_path)
        .with_context(|| format!("Failed to create {}", base_path.display()))?;

    let config_path = base_path.join(CONFIG_FILE);
    if !config_path.exists() {
        Config::default().save(&config_path)?;
        println!("  {} Created {}", "✓".green(), config_path.display());
    } else {
        println!("  {} {} already exists", "•".yellow(), config_path.display());
    }

    println!();
    println!("{} Coil project initialized!", "✓".green().bold());
    println!();
    println!("Next steps:");
    println!("  {} edit {}", "1.".blue(), CONFIG_FILE);
    println!("  {} coil run --seconds 60", "2.".blue());
    println!("  {} coil run --physics --json", "3.".blue());

    Ok(())
}

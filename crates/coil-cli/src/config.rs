//! Configuration management for Coil CLI.

use anyhow::{bail, Context, Result};
use coil::prelude::ArenaConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "coil.toml";

/// Coil project configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub run: RunConfig,
    #[serde(default)]
    pub arena: ArenaConfig,
}

/// How the CLI drives an arena.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Simulated seconds per run.
    #[serde(default = "default_seconds")]
    pub seconds: f32,
    /// Frames per simulated second.
    #[serde(default = "default_frame_rate")]
    pub frame_rate: u32,
    /// Constant steering in [-1, 1]; positive turns right.
    #[serde(default = "default_turn_input")]
    pub turn_input: f32,
}

// Default value functions
fn default_seconds() -> f32 { 30.0 }
fn default_frame_rate() -> u32 { 60 }
fn default_turn_input() -> f32 { 0.35 }

impl Default for Config {
    fn default() -> Self {
        Self {
            run: RunConfig::default(),
            arena: ArenaConfig::default(),
        }
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            seconds: default_seconds(),
            frame_rate: default_frame_rate(),
            turn_input: default_turn_input(),
        }
    }
}

impl RunConfig {
    pub fn frame_dt(&self) -> f32 {
        1.0 / self.frame_rate as f32
    }

    pub fn frames(&self) -> u64 {
        (self.seconds * self.frame_rate as f32).round() as u64
    }
}

impl Config {
    /// Load from `path`, or from coil.toml in the current or parent
    /// directories. Falls back to defaults when no file is found. Returns the
    /// file the config came from, if any.
    pub fn load(path: Option<&Path>) -> Result<(Self, Option<PathBuf>)> {
        let source = match path {
            Some(path) => Some(path.to_path_buf()),
            None => find_config_file(&std::env::current_dir()?),
        };
        let config = match &source {
            Some(path) => Self::load_from(path)?,
            None => Config::default(),
        };
        Ok((config, source))
    }

    /// Load and validate the config at `path`.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config: {}", path.display()))?;
        config
            .validate()
            .with_context(|| format!("Invalid config: {}", path.display()))?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.run.seconds.is_finite() && self.run.seconds > 0.0) {
            bail!("run.seconds must be positive, got {}", self.run.seconds);
        }
        if self.run.frame_rate == 0 {
            bail!("run.frame_rate must be at least 1");
        }
        self.arena.validate()?;
        Ok(())
    }

    /// Save config to the specified path.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = self.to_toml()?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config: {}", path.display()))?;
        Ok(())
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize config")
    }
}

/// Find coil.toml in `start` or its parent directories.
pub fn find_config_file(start: &Path) -> Option<PathBuf> {
    let mut dir = start.to_path_buf();
    loop {
        let config_path = dir.join(CONFIG_FILE);
        if config_path.exists() {
            return Some(config_path);
        }
        if !dir.pop() {
            break;
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use coil::prelude::DriveMode;
    use tempfile::TempDir;

    #[test]
    fn save_then_load_keeps_settings() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE);

        let mut config = Config::default();
        config.arena.seed = 17;
        config.arena.chain.mode = DriveMode::Physics;
        config.arena.segment_encapsulate_radius = Some(1.5);
        config.run.turn_input = -0.5;
        config.save(&path).unwrap();

        assert_eq!(Config::load_from(&path).unwrap(), config);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "[arena]\nseed = 3\n\n[arena.chain]\nsegment_count = 4\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.arena.seed, 3);
        assert_eq!(config.arena.chain.segment_count, 4);
        assert_eq!(config.arena.chain.spacing, 1.0);
        assert_eq!(config.run, RunConfig::default());
    }

    #[test]
    fn fireball_kinds_load_as_a_list() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(
            &path,
            r#"
[[arena.fireballs]]
kind = "fireball"

[[arena.fireballs]]
kind = "comet"
weight = 0.5
score_value = 30

[arena.fireballs.detector]
min_encapsulation = 5
"#,
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        let fireballs = &config.arena.fireballs;
        assert_eq!(fireballs.len(), 2);
        assert_eq!(fireballs[0].score_value, 10);
        assert_eq!(fireballs[1].kind.as_str(), "comet");
        assert_eq!(fireballs[1].weight, 0.5);
        assert_eq!(fireballs[1].score_value, 30);
        assert_eq!(fireballs[1].detector.min_encapsulation, 5);
    }

    #[test]
    fn invalid_values_are_rejected_with_the_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "[arena.chain]\nspacing = -1.0\n").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("Invalid config"));
    }

    #[test]
    fn finds_config_in_a_parent_directory() {
        let dir = TempDir::new().unwrap();
        Config::default().save(&dir.path().join(CONFIG_FILE)).unwrap();
        let nested = dir.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();

        assert_eq!(find_config_file(&nested), Some(dir.path().join(CONFIG_FILE)));
    }

    #[test]
    fn frames_follow_rate_and_duration() {
        let run = RunConfig {
            seconds: 2.5,
            frame_rate: 60,
            ..RunConfig::default()
        };
        assert_eq!(run.frames(), 150);
    }
}

//! Run an arena simulation.

use anyhow::{Context, Result};
use colored::Colorize;
use coil::prelude::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;

use crate::config::Config;

pub struct RunOptions {
    pub config: Option<PathBuf>,
    pub seconds: Option<f32>,
    pub seed: Option<u64>,
    pub physics: bool,
    pub json: bool,
}

pub fn run(options: RunOptions) -> Result<()> {
    let (mut config, source) = Config::load(options.config.as_deref())?;
    if let Some(seconds) = options.seconds {
        config.run.seconds = seconds;
    }
    if let Some(seed) = options.seed {
        config.arena.seed = seed;
    }
    if options.physics {
        config.arena.chain.mode = DriveMode::Physics;
        config.arena.leader.mode = Some(DriveMode::Physics);
    }
    config.validate()?;

    let mut arena = Arena::new(config.arena.clone()).context("Failed to build arena")?;
    arena.set_direction(DirectionInput::turn(config.run.turn_input));

    let frames = config.run.frames();
    let frame_dt = config.run.frame_dt();

    if !options.json {
        match &source {
            Some(path) => println!("{} Config: {}", "→".blue(), path.display()),
            None => println!("{} Config: defaults", "→".blue()),
        }
        println!(
            "{} Running {} frames ({}s, {} mode, seed {})...",
            "→".blue(),
            frames.to_string().cyan(),
            config.run.seconds,
            arena.chain().segment_mode().to_string().cyan(),
            config.arena.seed
        );
    }

    let pb = if options.json {
        ProgressBar::hidden()
    } else {
        ProgressBar::new(frames)
    };
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} frames {msg}")
            .context("Invalid progress template")?
            .progress_chars("#>-"),
    );

    for _ in 0..frames {
        for event in arena.step(frame_dt)? {
            match event {
                ArenaEvent::Nullified { neighbors, score, .. } => {
                    pb.set_message(format!("+{} ({} around)", score, neighbors));
                }
                ArenaEvent::EarthDestroyed { tick } => {
                    pb.println(format!("  {} Earth destroyed at frame {}", "✗".red(), tick));
                }
                _ => {}
            }
        }
        pb.inc(1);
    }
    pb.finish_and_clear();

    if options.json {
        let snapshot = arena.snapshot();
        println!(
            "{}",
            serde_json::to_string_pretty(&snapshot).context("Failed to serialize snapshot")?
        );
        return Ok(());
    }

    let stats = arena.stats();
    println!();
    println!("{} Simulation complete!", "✓".green().bold());
    println!(
        "  Fireballs: {} spawned, {} nullified, {} impacted, {} missed",
        stats.spawned.to_string().cyan(),
        stats.nullified.to_string().green(),
        stats.impacted.to_string().red(),
        stats.expired.to_string().dimmed()
    );
    println!("  Effects: {} played", stats.effects_played.to_string().cyan());
    println!("  Score: {}", stats.score.to_string().green().bold());
    println!("  Segments: {}", stats.segments.to_string().cyan());
    let health = format!("{}/{}", stats.earth_health, arena.earth().max_health());
    if stats.earth_destroyed {
        println!("  Earth: {}", "destroyed".red().bold());
    } else {
        println!("  Earth: {}", health.yellow());
    }
    for (kind, pool) in &stats.pools {
        println!(
            "  Pool {}: {} created, {} idle, {} destroyed, {} misuse",
            kind, pool.created, pool.idle, pool.destroyed, pool.misuse
        );
    }

    Ok(())
}

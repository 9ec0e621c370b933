//! Configuration for chains, leaders and encapsulation detectors.
//!
//! Every struct deserializes with per-field defaults so a partial TOML or
//! JSON document is enough. Nothing is built from a config before
//! `validate()` has accepted it.

use crate::error::{CoilError, ConfigError, Result};
use crate::types::{DriveMode, FollowMode, Tag};
use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

/// Settings for one trailing chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainConfig {
    /// Segments created at initialization.
    #[serde(default = "default_segment_count")]
    pub segment_count: usize,
    /// Distance every segment keeps from its predecessor.
    #[serde(default = "default_spacing")]
    pub spacing: f32,
    /// Blend rate (kinematic) or spring stiffness (physics).
    #[serde(default = "default_follow_strength")]
    pub follow_strength: f32,
    /// How segment poses are written.
    #[serde(default)]
    pub mode: DriveMode,
    /// How segment targets are derived.
    #[serde(default)]
    pub follow_mode: FollowMode,
    /// Velocity multiplier applied every physics step, in (0, 1].
    #[serde(default = "default_damping")]
    pub damping: f32,
    /// Leader body mass; segment bodies get half of it.
    #[serde(default = "default_mass")]
    pub mass: f32,
    /// Linear drag handed to every body the chain creates.
    #[serde(default = "default_drag")]
    pub drag: f32,
}

/// Settings for the chain's leader (the head).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderConfig {
    /// Constant forward speed in units per second.
    #[serde(default = "default_speed")]
    pub speed: f32,
    /// Maximum turn rate in degrees per second.
    #[serde(default = "default_turn_rate")]
    pub turn_rate: f32,
    /// Locomotion mode; falls back to the chain's mode when absent.
    #[serde(default)]
    pub mode: Option<DriveMode>,
    /// Optional play area the leader is clamped into.
    #[serde(default)]
    pub bounds: Option<Bounds>,
}

/// Axis-aligned rectangle in the simulation plane.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min: Vec2,
    pub max: Vec2,
}

impl Bounds {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    /// Clamp the planar part of `position` into the rectangle.
    pub fn clamp(&self, position: Vec3) -> Vec3 {
        Vec3::new(
            position.x.clamp(self.min.x, self.max.x),
            position.y.clamp(self.min.y, self.max.y),
            position.z,
        )
    }

    pub fn contains(&self, position: Vec3) -> bool {
        position.x >= self.min.x
            && position.x <= self.max.x
            && position.y >= self.min.y
            && position.y <= self.max.y
    }
}

/// Settings for one encapsulation detector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectorConfig {
    /// Radius of the spatial query around the tracked entity.
    #[serde(default = "default_detection_radius")]
    pub detection_radius: f32,
    /// Seconds between evaluations; 0 evaluates on every update.
    #[serde(default = "default_evaluation_interval")]
    pub evaluation_interval: f32,
    /// Matching neighbors needed within a single evaluation.
    #[serde(default = "default_min_encapsulation")]
    pub min_encapsulation: usize,
    /// Tag a neighbor must carry to be counted.
    #[serde(default = "Tag::segment")]
    pub tag: Tag,
}

// Default value functions
fn default_segment_count() -> usize { 10 }
fn default_spacing() -> f32 { 1.0 }
fn default_follow_strength() -> f32 { 10.0 }
fn default_damping() -> f32 { 0.8 }
fn default_mass() -> f32 { 1.0 }
fn default_drag() -> f32 { 1.0 }
fn default_speed() -> f32 { 5.0 }
fn default_turn_rate() -> f32 { 180.0 }
fn default_detection_radius() -> f32 { 3.0 }
fn default_evaluation_interval() -> f32 { 0.5 }
fn default_min_encapsulation() -> usize { 3 }

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            segment_count: default_segment_count(),
            spacing: default_spacing(),
            follow_strength: default_follow_strength(),
            mode: DriveMode::default(),
            follow_mode: FollowMode::default(),
            damping: default_damping(),
            mass: default_mass(),
            drag: default_drag(),
        }
    }
}

impl Default for LeaderConfig {
    fn default() -> Self {
        Self {
            speed: default_speed(),
            turn_rate: default_turn_rate(),
            mode: None,
            bounds: None,
        }
    }
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            detection_radius: default_detection_radius(),
            evaluation_interval: default_evaluation_interval(),
            min_encapsulation: default_min_encapsulation(),
            tag: Tag::segment(),
        }
    }
}

impl ChainConfig {
    pub fn with_segments(mut self, segment_count: usize) -> Self {
        self.segment_count = segment_count;
        self
    }

    pub fn with_spacing(mut self, spacing: f32) -> Self {
        self.spacing = spacing;
        self
    }

    pub fn with_follow_strength(mut self, follow_strength: f32) -> Self {
        self.follow_strength = follow_strength;
        self
    }

    pub fn with_mode(mut self, mode: DriveMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_follow_mode(mut self, follow_mode: FollowMode) -> Self {
        self.follow_mode = follow_mode;
        self
    }

    pub fn with_damping(mut self, damping: f32) -> Self {
        self.damping = damping;
        self
    }

    /// Mass given to each segment body.
    pub fn segment_mass(&self) -> f32 {
        self.mass * 0.5
    }

    pub fn validate(&self) -> Result<()> {
        require_positive("chain.spacing", self.spacing)?;
        require_positive("chain.follow_strength", self.follow_strength)?;
        require_positive("chain.mass", self.mass)?;
        require_non_negative("chain.drag", self.drag)?;
        if !(self.damping > 0.0 && self.damping <= 1.0) {
            return Err(CoilError::out_of_range("chain.damping", 0.0, 1.0, self.damping as f64));
        }
        if self.follow_mode == FollowMode::Clamp && self.mode == DriveMode::Physics {
            return Err(ConfigError::Incompatible(
                "clamp follow mode places segments directly and cannot use physics segment drive"
                    .to_string(),
            )
            .into());
        }
        Ok(())
    }
}

impl LeaderConfig {
    pub fn with_speed(mut self, speed: f32) -> Self {
        self.speed = speed;
        self
    }

    pub fn with_turn_rate(mut self, turn_rate: f32) -> Self {
        self.turn_rate = turn_rate;
        self
    }

    pub fn with_mode(mut self, mode: DriveMode) -> Self {
        self.mode = Some(mode);
        self
    }

    pub fn with_bounds(mut self, bounds: Bounds) -> Self {
        self.bounds = Some(bounds);
        self
    }

    /// The leader's mode, defaulting to the chain's.
    pub fn resolved_mode(&self, chain: &ChainConfig) -> DriveMode {
        self.mode.unwrap_or(chain.mode)
    }

    pub fn validate(&self) -> Result<()> {
        require_non_negative("leader.speed", self.speed)?;
        require_non_negative("leader.turn_rate", self.turn_rate)?;
        if let Some(bounds) = &self.bounds {
            if !(bounds.min.is_finite() && bounds.max.is_finite())
                || bounds.min.x > bounds.max.x
                || bounds.min.y > bounds.max.y
            {
                return Err(CoilError::invalid_config(
                    "leader.bounds",
                    format!("{:?}..{:?}", bounds.min, bounds.max),
                    "min must not exceed max",
                ));
            }
        }
        Ok(())
    }
}

impl DetectorConfig {
    pub fn with_radius(mut self, detection_radius: f32) -> Self {
        self.detection_radius = detection_radius;
        self
    }

    pub fn with_interval(mut self, evaluation_interval: f32) -> Self {
        self.evaluation_interval = evaluation_interval;
        self
    }

    pub fn with_min_encapsulation(mut self, min_encapsulation: usize) -> Self {
        self.min_encapsulation = min_encapsulation;
        self
    }

    pub fn validate(&self) -> Result<()> {
        require_positive("detector.detection_radius", self.detection_radius)?;
        require_non_negative("detector.evaluation_interval", self.evaluation_interval)?;
        if self.min_encapsulation == 0 {
            return Err(CoilError::invalid_config(
                "detector.min_encapsulation",
                "0",
                "at least one neighbor is required",
            ));
        }
        Ok(())
    }
}

fn require_positive(field: &str, value: f32) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(CoilError::invalid_config(field, value.to_string(), "must be positive"))
    }
}

fn require_non_negative(field: &str, value: f32) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(CoilError::invalid_config(field, value.to_string(), "must not be negative"))
    }
}

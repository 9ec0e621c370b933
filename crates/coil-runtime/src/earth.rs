//! Earth — the target fireballs fall toward.

use coil_core::error::{CoilError, Result};
use glam::Vec3;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EarthConfig {
    #[serde(default)]
    pub position: Vec3,
    /// A fireball within this distance of the center has hit.
    #[serde(default = "default_radius")]
    pub radius: f32,
    #[serde(default = "default_max_health")]
    pub max_health: u32,
}

fn default_radius() -> f32 { 2.0 }
fn default_max_health() -> u32 { 100 }

impl Default for EarthConfig {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            radius: default_radius(),
            max_health: default_max_health(),
        }
    }
}

impl EarthConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.radius.is_finite() && self.radius > 0.0) {
            return Err(CoilError::invalid_config(
                "earth.radius",
                self.radius.to_string(),
                "must be positive",
            ));
        }
        if self.max_health == 0 {
            return Err(CoilError::invalid_config(
                "earth.max_health",
                "0",
                "must be at least 1",
            ));
        }
        Ok(())
    }
}

/// A damageable sphere at a fixed position.
#[derive(Debug, Clone, Serialize)]
pub struct Earth {
    position: Vec3,
    radius: f32,
    max_health: u32,
    health: u32,
    hits: u32,
}

impl Earth {
    pub fn new(config: &EarthConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            position: config.position,
            radius: config.radius,
            max_health: config.max_health,
            health: config.max_health,
            hits: 0,
        })
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn health(&self) -> u32 {
        self.health
    }

    pub fn max_health(&self) -> u32 {
        self.max_health
    }

    pub fn hits(&self) -> u32 {
        self.hits
    }

    pub fn is_destroyed(&self) -> bool {
        self.health == 0
    }

    /// Whether `point` lies on or inside the surface.
    pub fn contains(&self, point: Vec3) -> bool {
        self.position.distance(point) <= self.radius
    }

    /// First point on the path `from -> to` that touches the surface, if
    /// the path reaches it at all. Catches fast projectiles that would step
    /// over the sphere between two frames.
    pub fn sweep(&self, from: Vec3, to: Vec3) -> Option<Vec3> {
        if self.contains(from) {
            return Some(from);
        }
        let path = to - from;
        let a = path.length_squared();
        if a <= f32::EPSILON {
            return None;
        }
        // Smallest t in [0, 1] with |from + t * path - center| = radius
        let offset = from - self.position;
        let b = 2.0 * offset.dot(path);
        let c = offset.length_squared() - self.radius * self.radius;
        let discriminant = b * b - 4.0 * a * c;
        if discriminant < 0.0 {
            return None;
        }
        let t = (-b - discriminant.sqrt()) / (2.0 * a);
        (0.0..=1.0).contains(&t).then(|| from + path * t)
    }

    /// Apply damage. Returns `true` only on the hit that destroys the earth.
    pub fn take_damage(&mut self, damage: u32) -> bool {
        if self.is_destroyed() {
            return false;
        }
        self.hits += 1;
        self.health = self.health.saturating_sub(damage);
        debug!(damage, health = self.health, "Earth hit");
        if self.is_destroyed() {
            info!(hits = self.hits, "Earth destroyed");
            return true;
        }
        false
    }
}

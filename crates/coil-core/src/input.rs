//! Directional input as the simulation sees it.
//!
//! Raw keyboard, touch and swipe handling lives outside Coil. Whatever
//! produces input hands over a 2D direction; only its horizontal component
//! steers the leader.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// A normalized 2D steering direction.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DirectionInput {
    direction: Vec2,
}

impl DirectionInput {
    /// No steering.
    pub const NONE: Self = Self { direction: Vec2::ZERO };

    /// Normalize an arbitrary vector. Zero (or non-finite) input stays zero.
    pub fn from_vector(v: Vec2) -> Self {
        Self {
            direction: v.try_normalize().unwrap_or(Vec2::ZERO),
        }
    }

    /// Steer left (-1) or right (+1) with the given strength.
    pub fn turn(amount: f32) -> Self {
        Self {
            direction: Vec2::new(amount.clamp(-1.0, 1.0), 0.0),
        }
    }

    pub fn direction(&self) -> Vec2 {
        self.direction
    }

    /// Turn input in [-1, 1]; positive turns right.
    pub fn turn_input(&self) -> f32 {
        let x = self.direction.x;
        if x.is_finite() {
            x.clamp(-1.0, 1.0)
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_horizontal_component_steers() {
        let input = DirectionInput::from_vector(Vec2::new(3.0, 4.0));
        assert!((input.turn_input() - 0.6).abs() < 1e-6);
    }

    #[test]
    fn zero_vector_does_not_steer() {
        assert_eq!(DirectionInput::from_vector(Vec2::ZERO).turn_input(), 0.0);
        assert_eq!(DirectionInput::NONE.turn_input(), 0.0);
    }

    #[test]
    fn turn_is_clamped() {
        assert_eq!(DirectionInput::turn(4.0).turn_input(), 1.0);
        assert_eq!(DirectionInput::turn(-4.0).turn_input(), -1.0);
    }
}

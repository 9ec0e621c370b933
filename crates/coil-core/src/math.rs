//! Small vector helpers shared by the chain and runtime crates.
//!
//! Every helper that divides by a length returns `Option` so a degenerate
//! (zero-length) direction is absorbed by the caller instead of turning
//! into NaN further down the chain.

use glam::{Quat, Vec2, Vec3};

/// Directions shorter than this are treated as "no direction".
pub const DIRECTION_EPSILON: f32 = 1e-5;

/// Normalize `v`, or `None` when it is too short to carry a direction.
pub fn safe_normalize(v: Vec3) -> Option<Vec3> {
    let length = v.length();
    if length.is_finite() && length > DIRECTION_EPSILON {
        Some(v / length)
    } else {
        None
    }
}

/// Rotation whose forward axis (+Y) points along `direction`, with +Z kept
/// as the plane normal. The direction is projected onto the XY plane.
pub fn look_rotation(direction: Vec3) -> Option<Quat> {
    let planar = Vec2::new(direction.x, direction.y);
    if !planar.is_finite() || planar.length() <= DIRECTION_EPSILON {
        return None;
    }
    Some(Quat::from_rotation_z((-planar.x).atan2(planar.y)))
}

/// Per-step interpolation factor `rate × dt`, clamped to `[0, 1]`.
///
/// This is the linear approximation of `1 − e^(−rate·dt)`; it overshoots
/// the exponential at large `dt` and saturates at 1.
pub fn blend_factor(rate: f32, dt: f32) -> f32 {
    (rate * dt).clamp(0.0, 1.0)
}

/// Rotation about +Z by `degrees`.
pub fn yaw_degrees(degrees: f32) -> Quat {
    Quat::from_rotation_z(degrees.to_radians())
}

/// Clamp `v` to a maximum length, keeping its direction.
pub fn clamp_length(v: Vec3, max: f32) -> Vec3 {
    let length = v.length();
    if length > max && length > DIRECTION_EPSILON {
        v * (max / length)
    } else {
        v
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_vector_has_no_direction() {
        assert!(safe_normalize(Vec3::ZERO).is_none());
        assert!(look_rotation(Vec3::ZERO).is_none());
        assert!(look_rotation(Vec3::Z).is_none());
    }

    #[test]
    fn look_rotation_points_forward_axis() {
        for dir in [Vec3::X, Vec3::Y, -Vec3::X, Vec3::new(1.0, -1.0, 0.0)] {
            let rotation = look_rotation(dir).unwrap();
            let forward = rotation * Vec3::Y;
            assert!((forward - dir.normalize()).length() < 1e-5, "dir {dir:?}");
        }
    }

    #[test]
    fn blend_factor_saturates() {
        assert!((blend_factor(10.0, 0.02) - 0.2).abs() < 1e-6);
        assert_eq!(blend_factor(10.0, 1.0), 1.0);
        assert_eq!(blend_factor(10.0, -1.0), 0.0);
    }

    #[test]
    fn negative_yaw_turns_right() {
        let forward = yaw_degrees(-90.0) * Vec3::Y;
        assert!((forward - Vec3::X).length() < 1e-5);
    }

    #[test]
    fn clamp_length_keeps_short_vectors() {
        assert_eq!(clamp_length(Vec3::new(1.0, 0.0, 0.0), 2.0), Vec3::X);
        let clamped = clamp_length(Vec3::new(3.0, 4.0, 0.0), 1.0);
        assert!((clamped.length() - 1.0).abs() < 1e-6);
    }
}

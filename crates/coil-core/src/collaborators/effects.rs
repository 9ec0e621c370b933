//! Effect sinks — fire-and-forget visual notifications.
//!
//! Coil raises an effect and moves on. It never waits for an effect to
//! finish and never observes its lifetime.

use crate::types::EffectKind;
use glam::{Quat, Vec3};

/// Receives effect requests.
pub trait EffectSink {
    fn raise(&mut self, kind: EffectKind, position: Vec3, rotation: Quat);
}

impl<F> EffectSink for F
where
    F: FnMut(EffectKind, Vec3, Quat),
{
    fn raise(&mut self, kind: EffectKind, position: Vec3, rotation: Quat) {
        self(kind, position, rotation)
    }
}

/// Sink that drops every request.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoEffects;

impl EffectSink for NoEffects {
    fn raise(&mut self, _kind: EffectKind, _position: Vec3, _rotation: Quat) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closures_are_sinks() {
        let mut raised = Vec::new();
        {
            let mut sink = |kind: EffectKind, position: Vec3, _rotation: Quat| raised.push((kind, position));
            sink.raise(EffectKind::Impact, Vec3::X, Quat::IDENTITY);
        }
        assert_eq!(raised, vec![(EffectKind::Impact, Vec3::X)]);
    }
}

use glam::Vec3;

use super::second_order::{RotationSpring, SecondOrderDynamics, SpringPreset};
use crate::math::Transform;

/// Filters a raw tracker pose before it is written into an IK target.
///
/// Position and orientation each run through their own second-order spring.
/// The solver itself stays stateless, so smoothing lives entirely on the
/// producer side.
#[derive(Debug, Clone, Copy)]
pub struct TargetSmoother {
    position: SecondOrderDynamics<Vec3>,
    rotation: RotationSpring,
}

impl TargetSmoother {
    /// Same preset for position and rotation.
    pub fn new(preset: SpringPreset, initial: Transform) -> Self {
        Self::with_presets(preset, preset, initial)
    }

    pub fn with_presets(
        position: SpringPreset,
        rotation: SpringPreset,
        initial: Transform,
    ) -> Self {
        Self {
            position: SecondOrderDynamics::from_preset(position, initial.position),
            rotation: RotationSpring::from_preset(rotation, initial.rotation),
        }
    }

    pub fn reset(&mut self, pose: Transform) {
        self.position.reset(pose.position);
        self.rotation.reset(pose.rotation);
    }

    pub fn update(&mut self, raw: Transform, dt: f32) -> Transform {
        Transform::new(
            self.position.update(raw.position, dt),
            self.rotation.update(raw.rotation, dt),
        )
    }

    pub fn current(&self) -> Transform {
        Transform::new(self.position.current(), self.rotation.current())
    }
}

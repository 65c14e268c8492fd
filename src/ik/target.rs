use glam::{Quat, Vec3};

use crate::math::Transform;

/// Goal for one chain's limb, stored relative to a parent frame so it
/// follows that frame when it moves.
///
/// Body targets live in the character root's frame. Finger targets live in
/// their hand target's frame; [`IkManager::target_frame`] returns the frame
/// a given chain uses.
///
/// [`IkManager::target_frame`]: super::IkManager::target_frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IkTarget {
    pub pose: Transform,
    pub hint: Option<Vec3>,
}

impl IkTarget {
    pub fn new(pose: Transform) -> Self {
        Self { pose, hint: None }
    }

    pub fn world_pose(&self, frame: &Transform) -> Transform {
        frame.mul_transform(&self.pose)
    }

    pub fn set_world_pose(&mut self, frame: &Transform, position: Vec3, rotation: Quat) {
        self.pose = frame
            .inverse()
            .mul_transform(&Transform::new(position, rotation));
    }

    pub fn world_hint(&self, frame: &Transform) -> Option<Vec3> {
        self.hint.map(|h| frame.transform_point(h))
    }

    pub fn set_world_hint(&mut self, frame: &Transform, hint: Option<Vec3>) {
        self.hint = hint.map(|h| frame.inverse_transform_point(h));
    }

    /// World-space goal handed to the solver.
    pub fn goal(&self, frame: &Transform) -> SolveGoal {
        let world = self.world_pose(frame);
        SolveGoal {
            position: world.position,
            rotation: world.rotation,
            hint: self.world_hint(frame),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolveGoal {
    pub position: Vec3,
    pub rotation: Quat,
    pub hint: Option<Vec3>,
}

impl SolveGoal {
    pub fn new(position: Vec3, rotation: Quat) -> Self {
        Self {
            position,
            rotation,
            hint: None,
        }
    }

    pub fn with_hint(mut self, hint: Vec3) -> Self {
        self.hint = Some(hint);
        self
    }

    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::NEG_Z
    }

    /// A goal with non-finite components cannot be solved toward.
    pub fn is_valid(&self) -> bool {
        self.position.is_finite()
            && self.rotation.is_finite()
            && self.rotation.length_squared() > 0.0
            && self.hint.map_or(true, |h| h.is_finite())
    }
}

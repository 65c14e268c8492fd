use glam::{Quat, Vec3};

use super::{HumanBone, JointId};
use crate::math::Transform;

/// Live joint hierarchy the IK layer reads from and writes rotations into.
///
/// Implementations resolve logical bones to joints, expose parent links and
/// world transforms, and must keep world transforms of a joint's subtree in
/// sync whenever its local rotation changes.
pub trait SkeletonProvider {
    /// World transform of the character root; targets live in this frame.
    fn root(&self) -> Transform;

    fn bone(&self, bone: HumanBone) -> Option<JointId>;

    fn parent(&self, joint: JointId) -> Option<JointId>;

    fn world(&self, joint: JointId) -> Option<Transform>;

    fn local_rotation(&self, joint: JointId) -> Option<Quat>;

    fn set_local_rotation(&mut self, joint: JointId, rotation: Quat);

    fn position(&self, joint: JointId) -> Option<Vec3> {
        self.world(joint).map(|t| t.position)
    }

    fn parent_rotation(&self, joint: JointId) -> Option<Quat> {
        match self.parent(joint) {
            Some(parent) => self.world(parent).map(|t| t.rotation),
            None => Some(self.root().rotation),
        }
    }

    /// Local rotation that puts `joint` at the given world orientation.
    fn local_for_world_rotation(&self, joint: JointId, rotation: Quat) -> Option<Quat> {
        let parent = self.parent_rotation(joint)?;
        Some((parent.inverse() * rotation).normalize())
    }

    /// Pre-multiplies the joint's world orientation by `delta`, pivoting on
    /// the joint itself.
    fn rotate_world(&mut self, joint: JointId, delta: Quat) {
        let Some(world) = self.world(joint) else {
            return;
        };
        if let Some(local) = self.local_for_world_rotation(joint, delta * world.rotation) {
            self.set_local_rotation(joint, local);
        }
    }

    /// Bones present on this skeleton, in [`HumanBone::all`] order.
    fn bones(&self) -> Vec<(HumanBone, JointId)> {
        HumanBone::all()
            .filter_map(|bone| self.bone(bone).map(|joint| (bone, joint)))
            .collect()
    }
}

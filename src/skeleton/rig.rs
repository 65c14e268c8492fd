use glam::Quat;

use super::joint::{Joint, JointId};
use super::provider::SkeletonProvider;
use super::HumanBone;
use crate::error::{Result, SkeletonError};
use crate::math::Transform;

/// Joint hierarchy stored parent-before-child.
///
/// Every joint's parent has a lower index, so a single forward sweep
/// recomputes world transforms and a sweep starting at a joint reaches its
/// whole subtree.
#[derive(Debug, Clone)]
pub struct Skeleton {
    origin: Transform,
    joints: Vec<Joint>,
    bones: [Option<JointId>; HumanBone::COUNT],
}

impl Default for Skeleton {
    fn default() -> Self {
        Self::new(Transform::IDENTITY)
    }
}

impl Skeleton {
    pub fn new(origin: Transform) -> Self {
        Self {
            origin,
            joints: Vec::new(),
            bones: [None; HumanBone::COUNT],
        }
    }

    pub fn add_joint(
        &mut self,
        name: impl Into<String>,
        parent: Option<JointId>,
        local: Transform,
    ) -> Result<JointId> {
        let parent_world = match parent {
            Some(p) => {
                let joint = self.joints.get(p.0).ok_or(SkeletonError::InvalidParent {
                    parent: p.0,
                    len: self.joints.len(),
                })?;
                joint.world
            }
            None => self.origin,
        };

        let id = JointId(self.joints.len());
        let mut joint = Joint::new(name, parent, local);
        joint.world = parent_world.mul_transform(&local);
        self.joints.push(joint);
        Ok(id)
    }

    pub fn map_bone(&mut self, bone: HumanBone, joint: JointId) -> Result<()> {
        if joint.0 >= self.joints.len() {
            return Err(SkeletonError::UnknownJoint(joint.0));
        }
        let slot = &mut self.bones[bone.index()];
        if slot.is_some() {
            return Err(SkeletonError::DuplicateBone(bone));
        }
        *slot = Some(joint);
        Ok(())
    }

    /// Adds a joint named after `bone` and maps it in one step.
    pub fn add_bone(
        &mut self,
        bone: HumanBone,
        parent: Option<JointId>,
        local: Transform,
    ) -> Result<JointId> {
        if self.bones[bone.index()].is_some() {
            return Err(SkeletonError::DuplicateBone(bone));
        }
        let id = self.add_joint(bone.to_string(), parent, local)?;
        self.map_bone(bone, id)?;
        Ok(id)
    }

    pub fn joint(&self, id: JointId) -> Option<&Joint> {
        self.joints.get(id.0)
    }

    pub fn joints(&self) -> &[Joint] {
        &self.joints
    }

    pub fn joint_count(&self) -> usize {
        self.joints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.joints.is_empty()
    }

    pub fn find(&self, name: &str) -> Option<JointId> {
        self.joints.iter().position(|j| j.name == name).map(JointId)
    }

    pub fn origin(&self) -> Transform {
        self.origin
    }

    pub fn set_origin(&mut self, origin: Transform) {
        self.origin = origin;
        self.update_world();
    }

    pub fn set_local(&mut self, id: JointId, local: Transform) {
        if let Some(joint) = self.joints.get_mut(id.0) {
            joint.local = local;
            self.refresh_from(id);
        }
    }

    /// Recomputes every world transform from the local ones.
    pub fn update_world(&mut self) {
        for i in 0..self.joints.len() {
            self.joints[i].world = self.parent_world(i).mul_transform(&self.joints[i].local);
        }
    }

    fn parent_world(&self, index: usize) -> Transform {
        match self.joints[index].parent {
            Some(p) => self.joints[p.0].world,
            None => self.origin,
        }
    }

    fn refresh_from(&mut self, start: JointId) {
        let n = self.joints.len();
        let mut dirty = vec![false; n];

        dirty[start.0] = true;
        self.joints[start.0].world =
            self.parent_world(start.0).mul_transform(&self.joints[start.0].local);

        for i in start.0 + 1..n {
            let Some(parent) = self.joints[i].parent else {
                continue;
            };
            if dirty[parent.0] {
                dirty[i] = true;
                self.joints[i].world = self.joints[parent.0]
                    .world
                    .mul_transform(&self.joints[i].local);
            }
        }
    }
}

impl SkeletonProvider for Skeleton {
    fn root(&self) -> Transform {
        self.origin
    }

    fn bone(&self, bone: HumanBone) -> Option<JointId> {
        self.bones[bone.index()]
    }

    fn parent(&self, joint: JointId) -> Option<JointId> {
        self.joints.get(joint.0).and_then(|j| j.parent)
    }

    fn world(&self, joint: JointId) -> Option<Transform> {
        self.joints.get(joint.0).map(|j| j.world)
    }

    fn local_rotation(&self, joint: JointId) -> Option<Quat> {
        self.joints.get(joint.0).map(|j| j.local.rotation)
    }

    fn set_local_rotation(&mut self, joint: JointId, rotation: Quat) {
        if let Some(j) = self.joints.get_mut(joint.0) {
            j.local.rotation = rotation;
            self.refresh_from(joint);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use glam::Vec3;
    use std::f32::consts::FRAC_PI_2;

    fn arm() -> (Skeleton, [JointId; 3]) {
        let mut skeleton = Skeleton::default();
        let upper = skeleton
            .add_bone(HumanBone::LeftUpperArm, None, Transform::IDENTITY)
            .unwrap();
        let mid = skeleton
            .add_bone(
                HumanBone::LeftLowerArm,
                Some(upper),
                Transform::from_position(Vec3::new(0.0, -0.3, 0.0)),
            )
            .unwrap();
        let limb = skeleton
            .add_bone(
                HumanBone::LeftHand,
                Some(mid),
                Transform::from_position(Vec3::new(0.0, -0.3, 0.0)),
            )
            .unwrap();
        (skeleton, [upper, mid, limb])
    }

    #[test]
    fn world_positions_accumulate() {
        let (skeleton, [_, _, limb]) = arm();
        let p = skeleton.position(limb).unwrap();
        assert!(p.abs_diff_eq(Vec3::new(0.0, -0.6, 0.0), 1e-6));
    }

    #[test]
    fn invalid_parent_is_rejected() {
        let mut skeleton = Skeleton::default();
        let err = skeleton
            .add_joint("orphan", Some(JointId(3)), Transform::IDENTITY)
            .unwrap_err();
        assert_eq!(err, SkeletonError::InvalidParent { parent: 3, len: 0 });
    }

    #[test]
    fn duplicate_bone_is_rejected() {
        let (mut skeleton, [upper, ..]) = arm();
        assert_eq!(
            skeleton.map_bone(HumanBone::LeftHand, upper),
            Err(SkeletonError::DuplicateBone(HumanBone::LeftHand))
        );
        assert_eq!(
            skeleton.map_bone(HumanBone::Head, JointId(99)),
            Err(SkeletonError::UnknownJoint(99))
        );
    }

    #[test]
    fn rotating_a_joint_carries_its_subtree() {
        let (mut skeleton, [upper, mid, limb]) = arm();
        skeleton.rotate_world(upper, Quat::from_rotation_z(FRAC_PI_2));

        let m = skeleton.position(mid).unwrap();
        let l = skeleton.position(limb).unwrap();
        assert!(m.abs_diff_eq(Vec3::new(0.3, 0.0, 0.0), 1e-6));
        assert!(l.abs_diff_eq(Vec3::new(0.6, 0.0, 0.0), 1e-6));
        assert_relative_eq!((l - m).length(), 0.3, epsilon = 1e-6);
    }

    #[test]
    fn rotate_world_respects_parent_orientation() {
        let (mut skeleton, [upper, mid, limb]) = arm();
        skeleton.set_local_rotation(upper, Quat::from_rotation_x(0.4));
        skeleton.rotate_world(mid, Quat::from_rotation_y(0.9));

        let expected = Quat::from_rotation_y(0.9) * Quat::from_rotation_x(0.4);
        let actual = skeleton.world(mid).unwrap().rotation;
        assert!(actual.abs_diff_eq(expected, 1e-5));
        assert_relative_eq!(
            (skeleton.position(limb).unwrap() - skeleton.position(mid).unwrap()).length(),
            0.3,
            epsilon = 1e-6
        );
    }

    #[test]
    fn moving_the_origin_moves_everything() {
        let (mut skeleton, [upper, _, limb]) = arm();
        skeleton.set_origin(Transform::from_position(Vec3::new(1.0, 2.0, 0.0)));
        assert!(skeleton
            .position(upper)
            .unwrap()
            .abs_diff_eq(Vec3::new(1.0, 2.0, 0.0), 1e-6));
        assert!(skeleton
            .position(limb)
            .unwrap()
            .abs_diff_eq(Vec3::new(1.0, 1.4, 0.0), 1e-6));
    }

    #[test]
    fn bones_enumerates_mapped_bones() {
        let (skeleton, [upper, mid, limb]) = arm();
        assert_eq!(
            skeleton.bones(),
            vec![
                (HumanBone::LeftUpperArm, upper),
                (HumanBone::LeftLowerArm, mid),
                (HumanBone::LeftHand, limb),
            ]
        );
        assert_eq!(skeleton.find("LeftHand"), Some(limb));
    }
}

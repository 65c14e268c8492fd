//! Reference humanoid rig in T-pose.
//!
//! Y up, facing −Z, left side on −X. A non-human `Root` joint sits on the
//! floor under the hips so the hips chain has a pivot.

use glam::Vec3;

use super::{Finger, HumanBone, JointId, Phalanx, Side, Skeleton};
use crate::error::Result;
use crate::math::Transform;

pub const UPPER_ARM_LENGTH: f32 = 0.3;
pub const LOWER_ARM_LENGTH: f32 = 0.3;
pub const UPPER_LEG_LENGTH: f32 = 0.45;
pub const LOWER_LEG_LENGTH: f32 = 0.45;
pub const HIPS_HEIGHT: f32 = 1.0;

/// Offset of each finger's proximal joint from the hand, for the right hand.
const FINGER_ROOTS: [(Finger, Vec3); 5] = [
    (Finger::Thumb, Vec3::new(0.02, -0.01, -0.03)),
    (Finger::Index, Vec3::new(0.09, 0.0, -0.025)),
    (Finger::Middle, Vec3::new(0.09, 0.0, -0.005)),
    (Finger::Ring, Vec3::new(0.085, 0.0, 0.015)),
    (Finger::Little, Vec3::new(0.08, 0.0, 0.03)),
];

fn phalanx_length(finger: Finger, phalanx: Phalanx) -> f32 {
    match (finger, phalanx) {
        (_, Phalanx::Proximal) => 0.0,
        (Finger::Thumb, Phalanx::Intermediate) => 0.035,
        (Finger::Thumb, Phalanx::Distal) => 0.03,
        (Finger::Little, Phalanx::Intermediate) => 0.03,
        (Finger::Little, Phalanx::Distal) => 0.02,
        (_, Phalanx::Intermediate) => 0.04,
        (_, Phalanx::Distal) => 0.025,
    }
}

fn offset(x: f32, y: f32, z: f32) -> Transform {
    Transform::from_position(Vec3::new(x, y, z))
}

/// Builds the full reference rig, fingers included, placed at `origin`.
pub fn humanoid_t_pose(origin: Transform) -> Result<Skeleton> {
    let mut skeleton = Skeleton::new(origin);

    let root = skeleton.add_joint("Root", None, Transform::IDENTITY)?;
    let hips = skeleton.add_bone(HumanBone::Hips, Some(root), offset(0.0, HIPS_HEIGHT, 0.0))?;
    let spine = skeleton.add_bone(HumanBone::Spine, Some(hips), offset(0.0, 0.1, 0.0))?;
    let chest = skeleton.add_bone(HumanBone::Chest, Some(spine), offset(0.0, 0.2, 0.0))?;
    let neck = skeleton.add_bone(HumanBone::Neck, Some(chest), offset(0.0, 0.2, 0.0))?;
    skeleton.add_bone(HumanBone::Head, Some(neck), offset(0.0, 0.1, 0.0))?;

    for side in Side::BOTH {
        add_arm(&mut skeleton, chest, side)?;
        add_leg(&mut skeleton, hips, side)?;
    }

    Ok(skeleton)
}

fn add_arm(skeleton: &mut Skeleton, chest: JointId, side: Side) -> Result<()> {
    let s = side.sign();
    let (shoulder, upper, lower) = match side {
        Side::Left => (
            HumanBone::LeftShoulder,
            HumanBone::LeftUpperArm,
            HumanBone::LeftLowerArm,
        ),
        Side::Right => (
            HumanBone::RightShoulder,
            HumanBone::RightUpperArm,
            HumanBone::RightLowerArm,
        ),
    };

    let shoulder = skeleton.add_bone(shoulder, Some(chest), offset(0.05 * s, 0.15, 0.0))?;
    let upper = skeleton.add_bone(upper, Some(shoulder), offset(0.1 * s, 0.0, 0.0))?;
    let lower = skeleton.add_bone(lower, Some(upper), offset(UPPER_ARM_LENGTH * s, 0.0, 0.0))?;
    let hand = skeleton.add_bone(
        HumanBone::hand(side),
        Some(lower),
        offset(LOWER_ARM_LENGTH * s, 0.0, 0.0),
    )?;

    for (finger, root) in FINGER_ROOTS {
        let mut parent = hand;
        for phalanx in Phalanx::ALL {
            let local = match phalanx {
                Phalanx::Proximal => offset(root.x * s, root.y, root.z),
                _ => offset(phalanx_length(finger, phalanx) * s, 0.0, 0.0),
            };
            parent = skeleton.add_bone(HumanBone::Finger(side, finger, phalanx), Some(parent), local)?;
        }
    }
    Ok(())
}

fn add_leg(skeleton: &mut Skeleton, hips: JointId, side: Side) -> Result<()> {
    let s = side.sign();
    let (upper, lower, foot) = match side {
        Side::Left => (
            HumanBone::LeftUpperLeg,
            HumanBone::LeftLowerLeg,
            HumanBone::LeftFoot,
        ),
        Side::Right => (
            HumanBone::RightUpperLeg,
            HumanBone::RightLowerLeg,
            HumanBone::RightFoot,
        ),
    };

    let upper = skeleton.add_bone(upper, Some(hips), offset(0.1 * s, -0.05, 0.0))?;
    let lower = skeleton.add_bone(lower, Some(upper), offset(0.0, -UPPER_LEG_LENGTH, 0.0))?;
    skeleton.add_bone(foot, Some(lower), offset(0.0, -LOWER_LEG_LENGTH, 0.0))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::skeleton::SkeletonProvider;
    use approx::assert_relative_eq;

    #[test]
    fn every_human_bone_is_mapped() {
        let skeleton = humanoid_t_pose(Transform::IDENTITY).unwrap();
        assert_eq!(skeleton.bones().len(), HumanBone::COUNT);
        assert_eq!(skeleton.joint_count(), HumanBone::COUNT + 1);
    }

    #[test]
    fn arms_are_mirror_images() {
        let skeleton = humanoid_t_pose(Transform::IDENTITY).unwrap();
        let left = skeleton.bone(HumanBone::LeftHand).unwrap();
        let right = skeleton.bone(HumanBone::RightHand).unwrap();
        let l = skeleton.position(left).unwrap();
        let r = skeleton.position(right).unwrap();
        assert_relative_eq!(l.x, -r.x, epsilon = 1e-6);
        assert_relative_eq!(l.y, r.y, epsilon = 1e-6);
        assert!(l.x < 0.0);
    }

    #[test]
    fn feet_rest_near_the_floor() {
        let skeleton = humanoid_t_pose(Transform::IDENTITY).unwrap();
        let foot = skeleton.bone(HumanBone::RightFoot).unwrap();
        assert_relative_eq!(skeleton.position(foot).unwrap().y, 0.05, epsilon = 1e-6);
    }
}

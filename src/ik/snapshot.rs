use super::chain::{ChainRotations, SkeletalChain};
use crate::math::Transform;
use crate::skeleton::SkeletonProvider;

/// Bound-pose record for one chain.
///
/// Solvers start from these local rotations every frame, so a solve never
/// depends on the previous frame's result.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoseSnapshot {
    pub rotations: ChainRotations,
    /// Target pose, in the character root's frame, at bind time.
    pub target: Transform,
}

impl PoseSnapshot {
    pub fn capture(
        skeleton: &dyn SkeletonProvider,
        chain: &SkeletalChain,
        target: Transform,
    ) -> Option<Self> {
        Some(Self {
            rotations: chain.local_rotations(skeleton)?,
            target,
        })
    }

    /// Re-records the joint rotations, keeping the target pose.
    pub fn recapture_joints(
        &mut self,
        skeleton: &dyn SkeletonProvider,
        chain: &SkeletalChain,
    ) -> bool {
        match chain.local_rotations(skeleton) {
            Some(rotations) => {
                self.rotations = rotations;
                true
            }
            None => false,
        }
    }

    pub fn apply(&self, skeleton: &mut dyn SkeletonProvider, chain: &SkeletalChain) {
        chain.set_local_rotations(skeleton, &self.rotations);
    }
}

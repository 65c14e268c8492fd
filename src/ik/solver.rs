use std::fmt::Debug;

use glam::{Quat, Vec3};

use super::chain::{ChainRotations, SkeletalChain};
use super::snapshot::PoseSnapshot;
use super::target::SolveGoal;
use crate::math::rotation_between;
use crate::skeleton::SkeletonProvider;

/// Keeps a reachable target just short of full extension, where the bend
/// plane is undefined.
pub const DEFAULT_REACH_MARGIN: f32 = 0.9999;

pub(crate) const MIN_CHAIN_LENGTH: f32 = 1e-6;

/// Clamps a blend weight to `[0, 1]`. NaN counts as 0.
pub(crate) fn unit_weight(weight: f32) -> f32 {
    if weight.is_nan() {
        0.0
    } else {
        weight.clamp(0.0, 1.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolverWeights {
    pub position: f32,
    pub rotation: f32,
    pub enabled: bool,
}

impl Default for SolverWeights {
    fn default() -> Self {
        Self {
            position: 1.0,
            rotation: 1.0,
            enabled: true,
        }
    }
}

impl SolverWeights {
    pub fn new(position: f32, rotation: f32) -> Self {
        Self {
            position: unit_weight(position),
            rotation: unit_weight(rotation),
            enabled: true,
        }
    }

    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }
}

/// A strategy for bringing a chain's limb to its goal.
///
/// Strategies only implement [`IkSolver::reach`]; the shared
/// [`IkSolver::solve`] wraps it with the reset, orientation and blend steps
/// so every strategy recomputes from the bound pose each frame.
pub trait IkSolver: Send + Sync + Debug {
    /// Rotates `upper` and `mid` so the limb lands on (or as close as possible
    /// to) the goal position.
    fn reach(&self, skeleton: &mut dyn SkeletonProvider, chain: &SkeletalChain, goal: &SolveGoal);

    fn clone_box(&self) -> Box<dyn IkSolver>;

    /// Full per-frame solve of one chain. Never fails; a chain whose joints
    /// cannot be read, or whose goal is not finite, is left untouched.
    fn solve(
        &self,
        skeleton: &mut dyn SkeletonProvider,
        chain: &SkeletalChain,
        goal: &SolveGoal,
        weights: SolverWeights,
        snapshot: &PoseSnapshot,
    ) {
        if !weights.enabled || !goal.is_valid() {
            return;
        }
        let Some(animated) = chain.local_rotations(&*skeleton) else {
            return;
        };

        snapshot.apply(skeleton, chain);
        self.reach(skeleton, chain, goal);

        let Some(solved) = chain.local_rotations(&*skeleton) else {
            return;
        };
        let limb = skeleton
            .local_for_world_rotation(chain.limb, goal.rotation)
            .unwrap_or(solved.limb);

        let blended = ChainRotations {
            upper: blend(animated.upper, solved.upper, weights.position),
            mid: blend(animated.mid, solved.mid, weights.position),
            limb: blend(animated.limb, limb, weights.rotation),
        };
        chain.set_local_rotations(skeleton, &blended);
    }
}

impl Clone for Box<dyn IkSolver> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

fn blend(animated: Quat, solved: Quat, weight: f32) -> Quat {
    if weight.is_nan() || weight <= 0.0 {
        animated
    } else if weight >= 1.0 {
        solved
    } else {
        animated.slerp(solved, weight).normalize()
    }
}

/// Pulls `target` onto the sphere of radius `max_distance` around `upper`
/// when it lies outside it.
pub fn clamp_reach(upper: Vec3, target: Vec3, max_distance: f32) -> Vec3 {
    let offset = target - upper;
    let distance = offset.length();
    upper + offset.normalize_or_zero() * distance.min(max_distance)
}

/// Analytic two-bone solver: aim, bend through the hint, point.
#[derive(Debug, Clone, Copy)]
pub struct TwoBoneSolver {
    pub reach_margin: f32,
}

impl Default for TwoBoneSolver {
    fn default() -> Self {
        Self {
            reach_margin: DEFAULT_REACH_MARGIN,
        }
    }
}

impl TwoBoneSolver {
    pub fn new(reach_margin: f32) -> Self {
        Self { reach_margin }
    }

    /// Shoulder angle of the triangle with sides `upper_len`, `lower_len` and
    /// `target_dist`, from the law of cosines.
    pub fn bend_angle(upper_len: f32, lower_len: f32, target_dist: f32) -> f32 {
        let cos = (lower_len * lower_len - upper_len * upper_len - target_dist * target_dist)
            / (-2.0 * upper_len * target_dist);
        cos.clamp(-1.0, 1.0).acos()
    }
}

impl IkSolver for TwoBoneSolver {
    fn reach(&self, skeleton: &mut dyn SkeletonProvider, chain: &SkeletalChain, goal: &SolveGoal) {
        let Some(start) = chain.positions(&*skeleton) else {
            return;
        };
        let upper_len = start.upper_length();
        let lower_len = start.lower_length();
        let chain_len = upper_len + lower_len;
        if chain_len <= MIN_CHAIN_LENGTH {
            log::trace!("zero-length chain at {:?}, skipped", chain.limb);
            return;
        }

        let upper = start.upper;
        let target = clamp_reach(upper, goal.position, chain_len * self.reach_margin);

        // Aim: swing the upper bone so mid lies on the upper→target line.
        if let Some(q) = rotation_between(start.mid - upper, target - upper) {
            skeleton.rotate_world(chain.upper, q);
        }

        // Bend: open the shoulder angle toward the hint.
        if let Some(hint) = goal.hint {
            let target_dist = (target - upper).length();
            if upper_len > MIN_CHAIN_LENGTH && target_dist > MIN_CHAIN_LENGTH {
                let theta = Self::bend_angle(upper_len, lower_len, target_dist);
                let mid = skeleton.position(chain.mid).unwrap_or(start.mid);
                let axis = (mid - upper).cross(hint - upper);
                if axis.length_squared() > MIN_CHAIN_LENGTH * MIN_CHAIN_LENGTH {
                    skeleton.rotate_world(chain.upper, Quat::from_axis_angle(axis.normalize(), theta));
                }
            }
        }

        // Point: swing the lower bone so the limb lands on the target.
        let (Some(mid), Some(limb)) = (skeleton.position(chain.mid), skeleton.position(chain.limb))
        else {
            return;
        };
        if let Some(q) = rotation_between(limb - mid, target - mid) {
            skeleton.rotate_world(chain.mid, q);
        }
    }

    fn clone_box(&self) -> Box<dyn IkSolver> {
        Box::new(*self)
    }
}

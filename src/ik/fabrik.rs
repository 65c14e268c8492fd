use glam::Vec3;

use super::chain::SkeletalChain;
use super::solver::{clamp_reach, IkSolver, DEFAULT_REACH_MARGIN, MIN_CHAIN_LENGTH};
use super::target::SolveGoal;
use crate::math::rotation_between;
use crate::skeleton::SkeletonProvider;

#[derive(Debug, Clone, Copy)]
pub struct SolveResult {
    pub converged: bool,
    pub iterations: u32,
    pub final_distance: f32,
}

/// Iterative strategy: FABRIK on the three joint positions, then the
/// positions are turned back into joint rotations.
#[derive(Debug, Clone, Copy)]
pub struct FabrikSolver {
    pub reach_margin: f32,
    pub tolerance: f32,
    pub max_iterations: u32,
}

impl Default for FabrikSolver {
    fn default() -> Self {
        Self {
            reach_margin: DEFAULT_REACH_MARGIN,
            tolerance: 0.001,
            max_iterations: 10,
        }
    }
}

impl FabrikSolver {
    pub fn new(tolerance: f32, max_iterations: u32) -> Self {
        Self {
            tolerance,
            max_iterations,
            ..Self::default()
        }
    }

    pub fn with_reach_margin(mut self, reach_margin: f32) -> Self {
        self.reach_margin = reach_margin;
        self
    }

    /// Runs FABRIK passes on `points` anchored at `points[0]`. The target is
    /// expected to be within reach already.
    pub fn solve_positions(
        &self,
        points: &mut [Vec3; 3],
        lengths: [f32; 2],
        target: Vec3,
    ) -> SolveResult {
        let base = points[0];

        for iteration in 0..self.max_iterations {
            Self::forward_pass(points, lengths, target);
            Self::backward_pass(points, lengths, base);

            let distance = (points[2] - target).length();
            if distance <= self.tolerance {
                return SolveResult {
                    converged: true,
                    iterations: iteration + 1,
                    final_distance: distance,
                };
            }
        }

        let final_distance = (points[2] - target).length();
        SolveResult {
            converged: final_distance <= self.tolerance,
            iterations: self.max_iterations,
            final_distance,
        }
    }

    fn forward_pass(points: &mut [Vec3; 3], lengths: [f32; 2], target: Vec3) {
        points[2] = target;

        for i in (0..2).rev() {
            let next = points[i + 1];
            points[i] = next + direction(points[i] - next) * lengths[i];
        }
    }

    fn backward_pass(points: &mut [Vec3; 3], lengths: [f32; 2], base: Vec3) {
        points[0] = base;

        for i in 1..3 {
            let prev = points[i - 1];
            points[i] = prev + direction(points[i] - prev) * lengths[i - 1];
        }
    }
}

fn direction(v: Vec3) -> Vec3 {
    let len = v.length();
    if len > 0.0001 {
        v / len
    } else {
        Vec3::Y
    }
}

impl IkSolver for FabrikSolver {
    fn reach(&self, skeleton: &mut dyn SkeletonProvider, chain: &SkeletalChain, goal: &SolveGoal) {
        let Some(start) = chain.positions(&*skeleton) else {
            return;
        };
        let lengths = [start.upper_length(), start.lower_length()];
        let chain_len = lengths[0] + lengths[1];
        if chain_len <= MIN_CHAIN_LENGTH {
            log::trace!("zero-length chain at {:?}, skipped", chain.limb);
            return;
        }

        let target = clamp_reach(start.upper, goal.position, chain_len * self.reach_margin);
        let mut points = [start.upper, start.mid, start.limb];

        // Seed the elbow on the hint side so the passes settle into that bend.
        if let Some(hint) = goal.hint {
            let toward_hint = (hint - start.upper).normalize_or_zero();
            if toward_hint != Vec3::ZERO {
                points[1] = start.upper + toward_hint * lengths[0];
            }
        }

        let result = self.solve_positions(&mut points, lengths, target);
        if !result.converged {
            log::trace!(
                "fabrik stopped after {} iterations, {:.5} from target",
                result.iterations,
                result.final_distance
            );
        }

        if let Some(q) = rotation_between(start.mid - start.upper, points[1] - points[0]) {
            skeleton.rotate_world(chain.upper, q);
        }
        let (Some(mid), Some(limb)) = (skeleton.position(chain.mid), skeleton.position(chain.limb))
        else {
            return;
        };
        if let Some(q) = rotation_between(limb - mid, points[2] - mid) {
            skeleton.rotate_world(chain.mid, q);
        }
    }

    fn clone_box(&self) -> Box<dyn IkSolver> {
        Box::new(*self)
    }
}

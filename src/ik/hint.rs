//! Pole-vector estimation for chains without a tracked hint.

use glam::{Quat, Vec3};

use super::chain::ChainPositions;
use crate::math::{project_on_plane, Transform};
use crate::skeleton::Side;

pub const DEFAULT_HINT_DISTANCE: f32 = 0.25;
pub const DEFAULT_STRAIGHT_ANGLE_DEGREES: f32 = 170.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HintKind {
    Elbow(Side),
    Knee,
}

#[derive(Debug, Clone, Copy)]
pub struct HintEstimator {
    /// How far from the mid joint the hint is placed.
    pub distance: f32,
    /// Above this angle between the bones the bend plane is treated as
    /// undefined and the previous hint is kept. Radians.
    pub straight_angle: f32,
}

impl Default for HintEstimator {
    fn default() -> Self {
        Self::new(DEFAULT_HINT_DISTANCE, DEFAULT_STRAIGHT_ANGLE_DEGREES)
    }
}

impl HintEstimator {
    pub fn new(distance: f32, straight_angle_degrees: f32) -> Self {
        Self {
            distance,
            straight_angle: straight_angle_degrees.to_radians(),
        }
    }

    /// World-space hint for one chain. `frame` is the character root;
    /// `previous` is last frame's hint, if any.
    pub fn estimate(
        &self,
        kind: HintKind,
        chain: &ChainPositions,
        target_position: Vec3,
        target_rotation: Quat,
        frame: &Transform,
        previous: Option<Vec3>,
    ) -> Vec3 {
        match kind {
            HintKind::Elbow(side) => self.elbow(side, chain, target_position, frame, previous),
            HintKind::Knee => self.knee(chain, target_rotation, frame, previous),
        }
    }

    pub fn elbow(
        &self,
        side: Side,
        chain: &ChainPositions,
        target: Vec3,
        frame: &Transform,
        previous: Option<Vec3>,
    ) -> Vec3 {
        let up = frame.up();
        let preferred = Self::preferred_elbow_direction(side, frame);
        let keep = || previous.unwrap_or(chain.mid + preferred * self.distance);

        let u = (chain.mid - chain.upper).normalize_or_zero();
        let v = (chain.mid - chain.limb).normalize_or_zero();
        if u == Vec3::ZERO || v == Vec3::ZERO || u.angle_between(v) >= self.straight_angle {
            return keep();
        }

        let mut bend = project_on_plane((u + v) * 0.5, up).normalize_or_zero();
        if bend == Vec3::ZERO {
            return keep();
        }

        // Positive when the bend points to the left of the reach direction.
        let reach = project_on_plane(target - chain.upper, up);
        let turn = reach.cross(bend).dot(up);
        let wrong_side = if turn.abs() > 1e-4 * reach.length() {
            turn * side.sign() > 0.0
        } else {
            bend.dot(preferred) < 0.0
        };
        if wrong_side {
            bend = -bend;
        }

        chain.mid + bend * self.distance
    }

    pub fn knee(
        &self,
        chain: &ChainPositions,
        target_rotation: Quat,
        frame: &Transform,
        previous: Option<Vec3>,
    ) -> Vec3 {
        let forward = project_on_plane(target_rotation * Vec3::NEG_Z, frame.up()).normalize_or_zero();
        if forward == Vec3::ZERO {
            return previous.unwrap_or(chain.mid + frame.forward() * self.distance);
        }
        chain.mid + forward * self.distance
    }

    /// Outward and backward from the character, for the given arm.
    pub fn preferred_elbow_direction(side: Side, frame: &Transform) -> Vec3 {
        (frame.right() * side.sign() - frame.forward()).normalize_or_zero()
    }
}

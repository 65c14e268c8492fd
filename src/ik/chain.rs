use std::fmt;

use glam::{Quat, Vec3};

use super::hint::HintKind;
use crate::skeleton::{Finger, HumanBone, JointId, Phalanx, SkeletonProvider, Side};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BodyChain {
    Hips,
    Head,
    LeftHand,
    RightHand,
    LeftFoot,
    RightFoot,
}

impl BodyChain {
    pub const ALL: [BodyChain; 6] = [
        BodyChain::Hips,
        BodyChain::Head,
        BodyChain::LeftHand,
        BodyChain::RightHand,
        BodyChain::LeftFoot,
        BodyChain::RightFoot,
    ];

    /// Bit of this chain in the body and auto-hint masks.
    pub fn bit(self) -> u32 {
        1 << self as u32
    }

    pub fn hand(side: Side) -> Self {
        match side {
            Side::Left => BodyChain::LeftHand,
            Side::Right => BodyChain::RightHand,
        }
    }

    pub fn foot(side: Side) -> Self {
        match side {
            Side::Left => BodyChain::LeftFoot,
            Side::Right => BodyChain::RightFoot,
        }
    }
}

/// One solvable chain of a humanoid: a body limb or a finger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChainId {
    Body(BodyChain),
    Finger(Side, Finger),
}

impl ChainId {
    pub const COUNT: usize = CHAIN_TABLE.len();

    /// Solve order: body first, then left-hand fingers, then right-hand fingers.
    pub fn all() -> impl Iterator<Item = ChainId> {
        CHAIN_TABLE.iter().map(|def| def.id)
    }

    pub fn index(self) -> usize {
        match self {
            ChainId::Body(body) => body as usize,
            ChainId::Finger(side, finger) => {
                let hand = match side {
                    Side::Left => 0,
                    Side::Right => 1,
                };
                BodyChain::ALL.len() + hand * Finger::ALL.len() + finger.index()
            }
        }
    }

    pub fn def(self) -> &'static ChainDef {
        &CHAIN_TABLE[self.index()]
    }

    /// Bit of this chain within its mask group.
    pub fn bit(self) -> u32 {
        match self {
            ChainId::Body(body) => body.bit(),
            ChainId::Finger(_, finger) => 1 << finger.index(),
        }
    }

    pub fn side(self) -> Option<Side> {
        self.def().limb.side()
    }

    pub fn hint_kind(self) -> Option<HintKind> {
        match self {
            ChainId::Body(BodyChain::LeftHand) => Some(HintKind::Elbow(Side::Left)),
            ChainId::Body(BodyChain::RightHand) => Some(HintKind::Elbow(Side::Right)),
            ChainId::Body(BodyChain::LeftFoot | BodyChain::RightFoot) => Some(HintKind::Knee),
            _ => None,
        }
    }

    /// The hand chain followed by its five finger chains.
    pub fn hand_group(side: Side) -> [ChainId; 6] {
        [
            ChainId::Body(BodyChain::hand(side)),
            ChainId::Finger(side, Finger::Thumb),
            ChainId::Finger(side, Finger::Index),
            ChainId::Finger(side, Finger::Middle),
            ChainId::Finger(side, Finger::Ring),
            ChainId::Finger(side, Finger::Little),
        ]
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChainId::Body(body) => write!(f, "{body:?}"),
            ChainId::Finger(side, finger) => write!(f, "{side}{finger}"),
        }
    }
}

/// How a chain's upper and mid joints are found from its limb joint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainRule {
    /// `mid` is the limb's parent, `upper` the mid's parent.
    Hierarchy,
    /// Single segment pivoting on the limb's parent joint.
    ParentPivot,
    /// Single segment pivoting on the first listed bone the skeleton has.
    Pivot(&'static [HumanBone]),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChainDef {
    pub id: ChainId,
    pub limb: HumanBone,
    pub rule: ChainRule,
}

const fn finger(side: Side, finger: Finger) -> ChainDef {
    ChainDef {
        id: ChainId::Finger(side, finger),
        limb: HumanBone::Finger(side, finger, Phalanx::Distal),
        rule: ChainRule::Hierarchy,
    }
}

const fn limb(body: BodyChain, limb: HumanBone) -> ChainDef {
    ChainDef {
        id: ChainId::Body(body),
        limb,
        rule: ChainRule::Hierarchy,
    }
}

/// Every chain a humanoid can carry, in solve order. Indexed by
/// [`ChainId::index`].
pub const CHAIN_TABLE: [ChainDef; 16] = [
    ChainDef {
        id: ChainId::Body(BodyChain::Hips),
        limb: HumanBone::Hips,
        rule: ChainRule::ParentPivot,
    },
    ChainDef {
        id: ChainId::Body(BodyChain::Head),
        limb: HumanBone::Head,
        rule: ChainRule::Pivot(&[HumanBone::Hips, HumanBone::Spine]),
    },
    limb(BodyChain::LeftHand, HumanBone::LeftHand),
    limb(BodyChain::RightHand, HumanBone::RightHand),
    limb(BodyChain::LeftFoot, HumanBone::LeftFoot),
    limb(BodyChain::RightFoot, HumanBone::RightFoot),
    finger(Side::Left, Finger::Thumb),
    finger(Side::Left, Finger::Index),
    finger(Side::Left, Finger::Middle),
    finger(Side::Left, Finger::Ring),
    finger(Side::Left, Finger::Little),
    finger(Side::Right, Finger::Thumb),
    finger(Side::Right, Finger::Index),
    finger(Side::Right, Finger::Middle),
    finger(Side::Right, Finger::Ring),
    finger(Side::Right, Finger::Little),
];

/// Three joints of one kinematic chain, upper → mid → limb.
///
/// Holds ids only; the skeleton owns the joints. Single-segment chains use
/// the same joint for `upper` and `mid`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SkeletalChain {
    pub upper: JointId,
    pub mid: JointId,
    pub limb: JointId,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChainPositions {
    pub upper: Vec3,
    pub mid: Vec3,
    pub limb: Vec3,
}

impl ChainPositions {
    pub fn upper_length(&self) -> f32 {
        (self.mid - self.upper).length()
    }

    pub fn lower_length(&self) -> f32 {
        (self.limb - self.mid).length()
    }

    pub fn length(&self) -> f32 {
        self.upper_length() + self.lower_length()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChainRotations {
    pub upper: Quat,
    pub mid: Quat,
    pub limb: Quat,
}

impl SkeletalChain {
    pub fn new(upper: JointId, mid: JointId, limb: JointId) -> Self {
        Self { upper, mid, limb }
    }

    /// Resolves the chain's joints on `skeleton`; `None` when a bone is missing.
    pub fn resolve(skeleton: &dyn SkeletonProvider, def: &ChainDef) -> Option<Self> {
        let limb = skeleton.bone(def.limb)?;
        let (upper, mid) = match def.rule {
            ChainRule::Hierarchy => {
                let mid = skeleton.parent(limb)?;
                (skeleton.parent(mid)?, mid)
            }
            ChainRule::ParentPivot => {
                let pivot = skeleton.parent(limb)?;
                (pivot, pivot)
            }
            ChainRule::Pivot(candidates) => {
                let pivot = candidates
                    .iter()
                    .filter_map(|bone| skeleton.bone(*bone))
                    .find(|&joint| is_ancestor(skeleton, joint, limb))?;
                (pivot, pivot)
            }
        };
        Some(Self { upper, mid, limb })
    }

    pub fn is_single_segment(&self) -> bool {
        self.upper == self.mid
    }

    pub fn joints(&self) -> [JointId; 3] {
        [self.upper, self.mid, self.limb]
    }

    pub fn positions(&self, skeleton: &dyn SkeletonProvider) -> Option<ChainPositions> {
        Some(ChainPositions {
            upper: skeleton.position(self.upper)?,
            mid: skeleton.position(self.mid)?,
            limb: skeleton.position(self.limb)?,
        })
    }

    pub fn local_rotations(&self, skeleton: &dyn SkeletonProvider) -> Option<ChainRotations> {
        Some(ChainRotations {
            upper: skeleton.local_rotation(self.upper)?,
            mid: skeleton.local_rotation(self.mid)?,
            limb: skeleton.local_rotation(self.limb)?,
        })
    }

    pub fn set_local_rotations(
        &self,
        skeleton: &mut dyn SkeletonProvider,
        rotations: &ChainRotations,
    ) {
        skeleton.set_local_rotation(self.upper, rotations.upper);
        skeleton.set_local_rotation(self.mid, rotations.mid);
        skeleton.set_local_rotation(self.limb, rotations.limb);
    }
}

fn is_ancestor(skeleton: &dyn SkeletonProvider, ancestor: JointId, joint: JointId) -> bool {
    let mut current = skeleton.parent(joint);
    while let Some(j) = current {
        if j == ancestor {
            return true;
        }
        current = skeleton.parent(j);
    }
    false
}

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub const BOTH: [Side; 2] = [Side::Left, Side::Right];

    pub fn opposite(self) -> Self {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }

    /// Sign of the side along the character's right axis.
    pub fn sign(self) -> f32 {
        match self {
            Side::Left => -1.0,
            Side::Right => 1.0,
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Finger {
    Thumb,
    Index,
    Middle,
    Ring,
    Little,
}

impl Finger {
    pub const ALL: [Finger; 5] = [
        Finger::Thumb,
        Finger::Index,
        Finger::Middle,
        Finger::Ring,
        Finger::Little,
    ];

    pub fn index(self) -> usize {
        self as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phalanx {
    Proximal,
    Intermediate,
    Distal,
}

impl Phalanx {
    pub const ALL: [Phalanx; 3] = [Phalanx::Proximal, Phalanx::Intermediate, Phalanx::Distal];
}

/// Logical humanoid bone identifier.
///
/// Hosts map these onto whatever joint naming their rigs use; everything
/// above the skeleton layer talks in terms of this closed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HumanBone {
    Hips,
    Spine,
    Chest,
    Neck,
    Head,
    LeftShoulder,
    LeftUpperArm,
    LeftLowerArm,
    LeftHand,
    RightShoulder,
    RightUpperArm,
    RightLowerArm,
    RightHand,
    LeftUpperLeg,
    LeftLowerLeg,
    LeftFoot,
    RightUpperLeg,
    RightLowerLeg,
    RightFoot,
    Finger(Side, Finger, Phalanx),
}

impl HumanBone {
    pub const BODY: [HumanBone; 19] = [
        HumanBone::Hips,
        HumanBone::Spine,
        HumanBone::Chest,
        HumanBone::Neck,
        HumanBone::Head,
        HumanBone::LeftShoulder,
        HumanBone::LeftUpperArm,
        HumanBone::LeftLowerArm,
        HumanBone::LeftHand,
        HumanBone::RightShoulder,
        HumanBone::RightUpperArm,
        HumanBone::RightLowerArm,
        HumanBone::RightHand,
        HumanBone::LeftUpperLeg,
        HumanBone::LeftLowerLeg,
        HumanBone::LeftFoot,
        HumanBone::RightUpperLeg,
        HumanBone::RightLowerLeg,
        HumanBone::RightFoot,
    ];

    const FINGER_BONES_PER_HAND: usize = 15;

    pub const COUNT: usize = Self::BODY.len() + 2 * Self::FINGER_BONES_PER_HAND;

    /// Every bone, body first, then left-hand then right-hand fingers.
    pub fn all() -> impl Iterator<Item = HumanBone> {
        Self::BODY.into_iter().chain(Side::BOTH.into_iter().flat_map(|side| {
            Finger::ALL.into_iter().flat_map(move |finger| {
                Phalanx::ALL
                    .into_iter()
                    .map(move |phalanx| HumanBone::Finger(side, finger, phalanx))
            })
        }))
    }

    /// Dense index in `0..COUNT`, matching the order of [`HumanBone::all`].
    pub fn index(self) -> usize {
        match self {
            HumanBone::Hips => 0,
            HumanBone::Spine => 1,
            HumanBone::Chest => 2,
            HumanBone::Neck => 3,
            HumanBone::Head => 4,
            HumanBone::LeftShoulder => 5,
            HumanBone::LeftUpperArm => 6,
            HumanBone::LeftLowerArm => 7,
            HumanBone::LeftHand => 8,
            HumanBone::RightShoulder => 9,
            HumanBone::RightUpperArm => 10,
            HumanBone::RightLowerArm => 11,
            HumanBone::RightHand => 12,
            HumanBone::LeftUpperLeg => 13,
            HumanBone::LeftLowerLeg => 14,
            HumanBone::LeftFoot => 15,
            HumanBone::RightUpperLeg => 16,
            HumanBone::RightLowerLeg => 17,
            HumanBone::RightFoot => 18,
            HumanBone::Finger(side, finger, phalanx) => {
                Self::BODY.len()
                    + side.index() * Self::FINGER_BONES_PER_HAND
                    + finger.index() * Phalanx::ALL.len()
                    + phalanx as usize
            }
        }
    }

    pub fn side(self) -> Option<Side> {
        match self {
            HumanBone::LeftShoulder
            | HumanBone::LeftUpperArm
            | HumanBone::LeftLowerArm
            | HumanBone::LeftHand
            | HumanBone::LeftUpperLeg
            | HumanBone::LeftLowerLeg
            | HumanBone::LeftFoot => Some(Side::Left),
            HumanBone::RightShoulder
            | HumanBone::RightUpperArm
            | HumanBone::RightLowerArm
            | HumanBone::RightHand
            | HumanBone::RightUpperLeg
            | HumanBone::RightLowerLeg
            | HumanBone::RightFoot => Some(Side::Right),
            HumanBone::Finger(side, ..) => Some(side),
            _ => None,
        }
    }

    pub fn hand(side: Side) -> Self {
        match side {
            Side::Left => HumanBone::LeftHand,
            Side::Right => HumanBone::RightHand,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl fmt::Display for Finger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl fmt::Display for HumanBone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HumanBone::Finger(side, finger, phalanx) => {
                write!(f, "{side}{finger}{phalanx:?}")
            }
            body => fmt::Debug::fmt(body, f),
        }
    }
}

//! Skeleton module
//!
//! Logical bone identifiers, the joint hierarchy the solvers rotate, and the
//! provider trait hosts implement to expose their own rigs.

pub mod bone;
pub mod humanoid;
pub mod joint;
pub mod provider;
pub mod rig;

pub use bone::{Finger, HumanBone, Phalanx, Side};
pub use humanoid::humanoid_t_pose;
pub use joint::{Joint, JointId};
pub use provider::SkeletonProvider;
pub use rig::Skeleton;

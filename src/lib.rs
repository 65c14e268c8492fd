//! # humanoid-ik
//!
//! Inverse kinematics for tracked humanoid avatars: a full-body rig driven by
//! a handful of tracker poses (head, hands, hips, feet) plus per-finger goals.
//!
//! ## Features
//! - Analytic two-bone solver with pole hints, FABRIK as an alternative strategy
//! - Fixed chain table covering six body limbs and ten fingers
//! - Automatic elbow and knee hints
//! - Enable masks, per-chain blend weights, calibration and hand mirroring
//! - Tracker smoothing with second-order dynamics
//!
//! ## Example
//! ```rust,ignore
//! use humanoid_ik::ik::{BodyChain, ChainId, IkManager};
//! use humanoid_ik::math::Transform;
//! use humanoid_ik::skeleton::humanoid_t_pose;
//! use glam::{Quat, Vec3};
//!
//! let mut skeleton = humanoid_t_pose(Transform::IDENTITY)?;
//! let mut manager = IkManager::default();
//! manager.bind(&skeleton);
//!
//! let root = skeleton.origin();
//! if let Some(target) = manager.target_mut(ChainId::Body(BodyChain::RightHand)) {
//!     target.set_world_pose(&root, Vec3::new(0.4, 1.2, -0.2), Quat::IDENTITY);
//! }
//! manager.update_tracking(&mut skeleton);
//! ```

pub mod dynamics;
pub mod error;
pub mod ik;
pub mod math;
pub mod pose;
pub mod skeleton;

pub use dynamics::{SecondOrderDynamics, SpringPreset, TargetSmoother};
pub use error::{Result, SkeletonError};
pub use ik::{
    BodyChain, ChainId, FabrikSolver, IkConfig, IkManager, IkSolver, IkTarget, MaskGroup,
    SolverKind, TwoBoneSolver,
};
pub use math::Transform;
pub use pose::PoseBuffer;
pub use skeleton::{humanoid_t_pose, HumanBone, Side, Skeleton, SkeletonProvider};

//! Inverse Kinematics module
//!
//! Chain table and data model, the solver strategies, hint estimation and the
//! per-skeleton manager that runs them every frame.

pub mod chain;
pub mod config;
pub mod fabrik;
pub mod hint;
pub mod manager;
pub mod snapshot;
pub mod solver;
pub mod target;

pub use chain::{
    BodyChain, ChainDef, ChainId, ChainPositions, ChainRotations, ChainRule, SkeletalChain,
    CHAIN_TABLE,
};
pub use config::{IkConfig, SolverKind};
pub use fabrik::{FabrikSolver, SolveResult};
pub use hint::{HintEstimator, HintKind};
pub use manager::{IkManager, MaskGroup};
pub use snapshot::PoseSnapshot;
pub use solver::{clamp_reach, IkSolver, SolverWeights, TwoBoneSolver};
pub use target::{IkTarget, SolveGoal};

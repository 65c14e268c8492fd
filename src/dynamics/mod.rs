//! Tracker-side smoothing applied before targets reach the solver.

mod second_order;
mod smoother;

pub use second_order::{
    RotationSpring, SecondOrderDynamics, SpringParams, SpringPreset, SpringValue,
};
pub use smoother::TargetSmoother;

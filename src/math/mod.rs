//! Math utilities module
//!
//! Rigid transforms plus the vector helpers the solvers share.

mod transform;

pub use transform::{project_on_plane, rotation_between, Transform};

// Re-export commonly used glam types
pub use glam::{Mat4, Quat, Vec3};

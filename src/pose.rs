use bytemuck::{Pod, Zeroable};

use crate::skeleton::Skeleton;

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct JointMatrix {
    pub cols: [[f32; 4]; 4],
}

/// World matrices of every joint, in joint order, ready to upload or record
/// after the solve pass.
#[derive(Debug, Clone, Default)]
pub struct PoseBuffer {
    matrices: Vec<JointMatrix>,
}

impl PoseBuffer {
    pub fn from_skeleton(skeleton: &Skeleton) -> Self {
        let mut buffer = Self::default();
        buffer.refresh(skeleton);
        buffer
    }

    /// Overwrites the buffer in place, reusing its allocation.
    pub fn refresh(&mut self, skeleton: &Skeleton) {
        self.matrices.clear();
        self.matrices.extend(skeleton.joints().iter().map(|joint| JointMatrix {
            cols: joint.world().to_matrix().to_cols_array_2d(),
        }));
    }

    pub fn matrices(&self) -> &[JointMatrix] {
        &self.matrices
    }

    pub fn len(&self) -> usize {
        self.matrices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matrices.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.matrices)
    }
}

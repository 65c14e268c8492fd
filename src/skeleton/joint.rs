use crate::math::Transform;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct JointId(pub usize);

impl JointId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone)]
pub struct Joint {
    pub name: String,
    pub parent: Option<JointId>,
    pub(crate) local: Transform,
    pub(crate) world: Transform,
}

impl Joint {
    pub(crate) fn new(name: impl Into<String>, parent: Option<JointId>, local: Transform) -> Self {
        Self {
            name: name.into(),
            parent,
            local,
            world: local,
        }
    }

    pub fn local(&self) -> Transform {
        self.local
    }

    pub fn world(&self) -> Transform {
        self.world
    }

    pub fn position(&self) -> glam::Vec3 {
        self.world.position
    }

    /// Length of the bone from the parent joint, read off the local offset.
    pub fn bone_length(&self) -> f32 {
        self.local.position.length()
    }
}

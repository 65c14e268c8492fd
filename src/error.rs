use thiserror::Error;

use crate::skeleton::HumanBone;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SkeletonError {
    #[error("Parent joint {parent} does not exist (skeleton has {len} joints)")]
    InvalidParent { parent: usize, len: usize },

    #[error("Bone {0} is already mapped to a joint")]
    DuplicateBone(HumanBone),

    #[error("Joint {0} does not exist")]
    UnknownJoint(usize),
}

pub type Result<T> = std::result::Result<T, SkeletonError>;

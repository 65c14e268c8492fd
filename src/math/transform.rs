use glam::{Mat4, Quat, Vec3};

/// Rigid pose of a joint or target: translation plus orientation.
///
/// Joints never scale, so composition stays exact enough for segment lengths
/// to survive any number of rotations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
    };

    pub fn new(position: Vec3, rotation: Quat) -> Self {
        Self { position, rotation }
    }

    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Self::IDENTITY
        }
    }

    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.rotation, self.position)
    }

    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::NEG_Z
    }

    pub fn up(&self) -> Vec3 {
        self.rotation * Vec3::Y
    }

    pub fn right(&self) -> Vec3 {
        self.rotation * Vec3::X
    }

    pub fn transform_point(&self, point: Vec3) -> Vec3 {
        self.rotation * point + self.position
    }

    pub fn inverse_transform_point(&self, point: Vec3) -> Vec3 {
        self.rotation.inverse() * (point - self.position)
    }

    pub fn transform_direction(&self, direction: Vec3) -> Vec3 {
        self.rotation * direction
    }

    /// `self * child`: the world pose of `child` expressed in this frame.
    pub fn mul_transform(&self, child: &Self) -> Self {
        Self {
            position: self.transform_point(child.position),
            rotation: (self.rotation * child.rotation).normalize(),
        }
    }

    pub fn inverse(&self) -> Self {
        let rotation = self.rotation.inverse();
        Self {
            position: rotation * -self.position,
            rotation,
        }
    }

    /// Reflects the pose across the character's YZ plane.
    ///
    /// Position X is negated; the rotation keeps X and W and negates Y and Z,
    /// which is the quaternion of the mirrored basis. Applying it twice is
    /// exact since only signs change.
    pub fn mirrored_x(&self) -> Self {
        Self {
            position: Vec3::new(-self.position.x, self.position.y, self.position.z),
            rotation: Quat::from_xyzw(
                self.rotation.x,
                -self.rotation.y,
                -self.rotation.z,
                self.rotation.w,
            ),
        }
    }

    pub fn is_finite(&self) -> bool {
        self.position.is_finite() && self.rotation.is_finite()
    }

    pub fn lerp(&self, other: &Self, t: f32) -> Self {
        Self {
            position: self.position.lerp(other.position, t),
            rotation: self.rotation.slerp(other.rotation, t),
        }
    }
}

/// Removes the component of `vector` along `normal`.
pub fn project_on_plane(vector: Vec3, normal: Vec3) -> Vec3 {
    let normal = normal.normalize_or_zero();
    vector - normal * vector.dot(normal)
}

/// Shortest-arc rotation carrying direction `from` onto `to`.
///
/// Returns `None` when the axis `from × to` is degenerate: either vector is
/// near zero, or they are parallel or anti-parallel.
pub fn rotation_between(from: Vec3, to: Vec3) -> Option<Quat> {
    let scale = from.length_squared() * to.length_squared();
    if scale < 1e-20 {
        return None;
    }

    let axis = from.cross(to);
    if axis.length_squared() <= scale * 1e-12 {
        return None;
    }

    let angle = axis.length().atan2(from.dot(to));
    Some(Quat::from_axis_angle(axis.normalize(), angle))
}
